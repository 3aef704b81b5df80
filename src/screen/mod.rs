//! Session gate, the two feature panels, and the tab switcher over them.

pub mod gate;
pub mod image_panel;
pub mod recipe_panel;

pub use gate::{derive_screen_state, ScreenState, SessionGate};
pub use image_panel::{ImagePanel, ANALYSIS_FAILED};
pub use recipe_panel::{parse_ingredients, RecipePanel, GENERATION_FAILED};

/// Which feature tab is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    RecipeGenerator,
    ImageToRecipe,
}

impl ActiveTab {
    pub fn label(&self) -> &'static str {
        match self {
            ActiveTab::RecipeGenerator => "Recipe Generator",
            ActiveTab::ImageToRecipe => "Image to Recipe",
        }
    }

    /// The `tab` command argument that selects this tab.
    pub fn command(&self) -> &'static str {
        match self {
            ActiveTab::RecipeGenerator => "recipe",
            ActiveTab::ImageToRecipe => "image",
        }
    }
}

/// Completion of a background panel request.
#[derive(Debug)]
pub enum ScreenEvent {
    RecipeFinished(Result<String, String>),
    AnalysisFinished(Result<String, String>),
}

/// The interactive screen: two tabbed panels sharing one session.
/// Switching tabs never touches the hidden panel's state.
#[derive(Debug, Default)]
pub struct Screen {
    pub active_tab: ActiveTab,
    pub recipe: RecipePanel,
    pub image: ImagePanel,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a completion to its panel, visible or not, and returns
    /// the tab it belongs to.
    pub fn apply_event(&mut self, event: ScreenEvent) -> ActiveTab {
        match event {
            ScreenEvent::RecipeFinished(result) => {
                self.recipe.finish_generate(result);
                ActiveTab::RecipeGenerator
            }
            ScreenEvent::AnalysisFinished(result) => {
                self.image.finish_analysis(result);
                ActiveTab::ImageToRecipe
            }
        }
    }
}
