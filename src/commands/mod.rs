use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ImageAnalysisRequest, RecipeApi};
use crate::auth::AuthSession;
use crate::picker::{encode_image_data_url, ImagePicker};
use crate::screen::{
    derive_screen_state, ActiveTab, Screen, ScreenEvent, ScreenState, SessionGate,
};

mod render;
mod system;

pub struct CommandHandler {
    auth: Box<dyn AuthSession>,
    api: Arc<dyn RecipeApi>,
    picker: Box<dyn ImagePicker>,
    gate: SessionGate,
    screen: Screen,
    events: UnboundedReceiver<ScreenEvent>,
    events_tx: UnboundedSender<ScreenEvent>,
    last_rendered: Option<ScreenState>,
}

impl CommandHandler {
    pub fn new(
        auth: Box<dyn AuthSession>,
        api: Arc<dyn RecipeApi>,
        picker: Box<dyn ImagePicker>,
    ) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        Self {
            auth,
            api,
            picker,
            gate: SessionGate::new(),
            screen: Screen::new(),
            events,
            events_tx,
            last_rendered: None,
        }
    }

    pub fn screen_state(&self) -> ScreenState {
        derive_screen_state(
            self.auth.is_ready(),
            self.auth.user_loading(),
            self.gate.profile_loading(),
            self.auth.is_authenticated(),
            self.gate.has_profile(),
        )
    }

    /// Brings the screen up to date before the next prompt: applies
    /// finished background requests, runs the profile fetch when one is
    /// due, and redraws the gate view when it changed.
    pub async fn refresh(&mut self) {
        self.drain_events();
        self.fetch_profile_if_needed().await;

        let state = self.screen_state();
        if self.last_rendered != Some(state) {
            self.render_state(state);
            self.last_rendered = Some(state);
        }
    }

    /// Applies completions that arrived while the prompt was idle. A
    /// completion for the hidden tab gets a short notice instead of a
    /// redraw.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let tab = self.screen.apply_event(event);
            if tab == self.screen.active_tab {
                self.render_active_panel();
            } else {
                render::background_notice(tab);
            }
        }
    }

    async fn fetch_profile_if_needed(&mut self) {
        let Some(user) = self.auth.current_user() else {
            return;
        };
        if !self.gate.begin_fetch(&user.email) {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("Loading your profile...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = self.api.fetch_profile().await;
        pb.finish_and_clear();

        self.gate.complete_fetch(&user.email, result);
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input, self.screen_state()),
            _ => {}
        }

        match self.screen_state() {
            ScreenState::Loading => {
                println!("⏳ Still loading, one moment...");
                Ok(())
            }
            ScreenState::SignedOut => self.handle_signed_out(input).await,
            ScreenState::ProfileSetup => self.handle_profile_setup(input),
            ScreenState::Ready => self.handle_ready(input),
        }
    }

    async fn handle_signed_out(&mut self, input: &str) -> Result<(), String> {
        if input.eq_ignore_ascii_case("signin") {
            return self.sign_in().await;
        }
        Err("Please sign in first. Type 'signin' to get started.".to_string())
    }

    fn handle_profile_setup(&mut self, input: &str) -> Result<(), String> {
        if input.eq_ignore_ascii_case("signout") {
            return self.sign_out();
        }
        Err(
            "Please complete your profile setup on the web version first. \
             Then sign out and back in here."
                .to_string(),
        )
    }

    fn handle_ready(&mut self, input: &str) -> Result<(), String> {
        match input.to_lowercase().as_str() {
            "show" => {
                self.render_ready();
                return Ok(());
            }
            "profile" => {
                render::profile_card(self.gate.profile());
                return Ok(());
            }
            "generate" => return self.generate_recipes(),
            "upload" => return self.upload_image(None),
            "signout" => return self.sign_out(),
            "ingredients" => {
                println!("Usage: ingredients <comma-separated list>");
                println!("Example: ingredients chicken, spinach, rice, tomatoes");
                return Ok(());
            }
            "prefs" => {
                self.screen.recipe.set_preferences("");
                println!("📝 Preferences cleared.");
                return Ok(());
            }
            "tab" => {
                println!("Please specify which tab to show.");
                println!("Usage: tab recipe or tab image");
                return Ok(());
            }
            _ => {}
        }

        if let Some(rest) = input.strip_prefix("tab ") {
            return self.switch_tab(rest.trim());
        }
        if let Some(rest) = input.strip_prefix("ingredients ") {
            self.screen.recipe.set_ingredients(rest.trim());
            println!("🥕 Ingredients set: {}", rest.trim().bright_yellow());
            return Ok(());
        }
        if let Some(rest) = input.strip_prefix("prefs ") {
            self.screen.recipe.set_preferences(rest.trim());
            println!("📝 Preferences set: {}", rest.trim().bright_yellow());
            return Ok(());
        }
        if let Some(rest) = input.strip_prefix("upload ") {
            return self.upload_image(Some(PathBuf::from(rest.trim())));
        }

        Err(format!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            input
        ))
    }

    async fn sign_in(&mut self) -> Result<(), String> {
        self.auth
            .sign_in()
            .await
            .map_err(|e| format!("Sign-in failed: {}", e))?;
        if self.auth.is_authenticated() {
            self.gate.reset();
            self.last_rendered = None;
        }
        Ok(())
    }

    fn sign_out(&mut self) -> Result<(), String> {
        self.auth
            .sign_out()
            .map_err(|e| format!("Sign-out failed: {}", e))?;
        self.gate.reset();
        self.screen = Screen::new();
        // Replace the event channel so completions spawned by the old
        // session cannot land on the new one.
        let (events_tx, events) = mpsc::unbounded_channel();
        self.events_tx = events_tx;
        self.events = events;
        self.last_rendered = None;
        println!("👋 Signed out.");
        Ok(())
    }

    fn generate_recipes(&mut self) -> Result<(), String> {
        self.screen.active_tab = ActiveTab::RecipeGenerator;
        if self.screen.recipe.loading() {
            println!("⏳ Recipe generation already in progress...");
            return Ok(());
        }
        let Some(request) = self.screen.recipe.begin_generate() else {
            println!("🥕 No ingredients yet. Set some first, e.g. 'ingredients chicken, rice'.");
            return Ok(());
        };

        println!(
            "🍳 Generating smart recipes from: {}",
            request.ingredients.join(", ").bright_yellow()
        );
        println!("{}", "Results will appear at the next prompt.".dimmed());

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api
                .suggest_recipes(&request)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ScreenEvent::RecipeFinished(result));
        });
        Ok(())
    }

    fn upload_image(&mut self, path: Option<PathBuf>) -> Result<(), String> {
        self.screen.active_tab = ActiveTab::ImageToRecipe;
        if self.screen.image.loading() {
            println!("⏳ Image analysis already in progress...");
            return Ok(());
        }
        // A cancelled picker leaves the panel exactly as it was.
        let Some(path) = path.or_else(|| self.picker.pick_image()) else {
            return Ok(());
        };

        self.screen.image.begin_analysis(path.clone());
        println!("📷 Selected: {}", path.display().to_string().bright_yellow());
        println!("🔍 Analyzing image...");
        println!("{}", "Results will appear at the next prompt.".dimmed());

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match encode_image_data_url(&path) {
                Ok(image_base64) => api
                    .analyze_image(&ImageAnalysisRequest { image_base64 })
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(ScreenEvent::AnalysisFinished(result));
        });
        Ok(())
    }

    fn switch_tab(&mut self, name: &str) -> Result<(), String> {
        let tab = match name.to_lowercase().as_str() {
            "recipe" | "generator" | "recipe-generator" => ActiveTab::RecipeGenerator,
            "image" | "photo" | "image-to-recipe" => ActiveTab::ImageToRecipe,
            other => {
                return Err(format!(
                    "Unknown tab: '{}'. Use 'tab recipe' or 'tab image'.",
                    other
                ))
            }
        };
        self.screen.active_tab = tab;
        self.render_active_panel();
        Ok(())
    }

    fn render_state(&self, state: ScreenState) {
        match state {
            ScreenState::Loading => render::loading_screen(),
            ScreenState::SignedOut => render::welcome_screen(),
            ScreenState::ProfileSetup => render::profile_setup_screen(),
            ScreenState::Ready => self.render_ready(),
        }
    }

    fn render_ready(&self) {
        render::header(&self.display_name());
        render::profile_card(self.gate.profile());
        render::tab_bar(self.screen.active_tab);
        self.render_active_panel();
        println!("\nType 'help' for commands.");
    }

    fn render_active_panel(&self) {
        match self.screen.active_tab {
            ActiveTab::RecipeGenerator => render::recipe_panel(&self.screen.recipe),
            ActiveTab::ImageToRecipe => render::image_panel(&self.screen.image),
        }
    }

    fn display_name(&self) -> String {
        let email = self
            .auth
            .current_user()
            .map(|u| u.email)
            .unwrap_or_default();
        match self.gate.profile() {
            Some(profile) => profile.display_name(&email),
            None => email,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::api::{MockApi, UserProfile};
    use crate::auth::CountingAuth;
    use crate::picker::FakePicker;
    use crate::screen::{ANALYSIS_FAILED, GENERATION_FAILED};

    fn profile() -> UserProfile {
        serde_json::from_str(r#"{"full_name": "Ana"}"#).unwrap()
    }

    fn handler(auth: CountingAuth, api: Arc<MockApi>, picker: FakePicker) -> CommandHandler {
        CommandHandler::new(Box::new(auth), api, Box::new(picker))
    }

    async fn ready_handler(api: Arc<MockApi>, picker: FakePicker) -> CommandHandler {
        let mut handler = handler(CountingAuth::signed_in("ana@example.com"), api, picker);
        handler.refresh().await;
        assert_eq!(handler.screen_state(), ScreenState::Ready);
        handler
    }

    async fn settle(handler: &mut CommandHandler) {
        let event = tokio::time::timeout(Duration::from_secs(5), handler.events.recv())
            .await
            .expect("timed out waiting for a panel completion")
            .expect("event channel closed");
        handler.screen.apply_event(event);
    }

    fn temp_photo(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("basket.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([120, 180, 40]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn not_ready_session_reads_as_loading() {
        let api = Arc::new(MockApi::new());
        let mut handler = handler(CountingAuth::not_ready(), api.clone(), FakePicker::cancelling());

        assert_eq!(handler.screen_state(), ScreenState::Loading);
        handler.handle_command("generate").await.unwrap();
        assert_eq!(api.suggest_calls(), 0);
    }

    #[tokio::test]
    async fn commands_require_sign_in() {
        let api = Arc::new(MockApi::new());
        let mut handler = handler(
            CountingAuth::signed_out(),
            api.clone(),
            FakePicker::cancelling(),
        );

        assert_eq!(handler.screen_state(), ScreenState::SignedOut);
        assert!(handler.handle_command("generate").await.is_err());
        assert_eq!(api.suggest_calls(), 0);
    }

    #[tokio::test]
    async fn signin_presses_call_the_collaborator_each_time() {
        let auth = CountingAuth::signed_out();
        let presses = auth.sign_in_counter();
        let mut handler = handler(auth, Arc::new(MockApi::new()), FakePicker::cancelling());

        handler.handle_command("signin").await.unwrap();
        assert_eq!(presses.load(std::sync::atomic::Ordering::SeqCst), 1);

        handler.handle_command("signin").await.unwrap();
        assert_eq!(presses.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_fetches_the_profile_once_per_identity() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = handler(
            CountingAuth::signed_in("ana@example.com"),
            api.clone(),
            FakePicker::cancelling(),
        );

        handler.refresh().await;
        assert_eq!(handler.screen_state(), ScreenState::Ready);
        assert_eq!(api.profile_calls(), 1);

        handler.refresh().await;
        assert_eq!(api.profile_calls(), 1);
    }

    #[tokio::test]
    async fn missing_profile_routes_to_setup() {
        let api = Arc::new(MockApi::new().with_missing_profile());
        let mut handler = handler(
            CountingAuth::signed_in("ana@example.com"),
            api.clone(),
            FakePicker::cancelling(),
        );

        handler.refresh().await;
        assert_eq!(handler.screen_state(), ScreenState::ProfileSetup);
    }

    #[tokio::test]
    async fn profile_fetch_failure_routes_to_setup_without_retry() {
        let api = Arc::new(MockApi::new().with_profile_status(500));
        let mut handler = handler(
            CountingAuth::signed_in("ana@example.com"),
            api.clone(),
            FakePicker::cancelling(),
        );

        handler.refresh().await;
        assert_eq!(handler.screen_state(), ScreenState::ProfileSetup);
        assert_eq!(api.profile_calls(), 1);

        handler.refresh().await;
        assert_eq!(api.profile_calls(), 1);
    }

    #[tokio::test]
    async fn generate_with_blank_ingredients_sends_nothing() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler.handle_command("generate").await.unwrap();
        handler.screen.recipe.set_ingredients("   ");
        handler.handle_command("generate").await.unwrap();

        assert_eq!(api.suggest_calls(), 0);
        assert!(handler.screen.recipe.suggestions().is_none());
        assert!(!handler.screen.recipe.loading());
    }

    #[tokio::test]
    async fn generate_sends_parsed_ingredients_and_preferences() {
        let api = Arc::new(
            MockApi::new()
                .with_profile(profile())
                .with_suggestions("Try X"),
        );
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler
            .handle_command("ingredients chicken, rice ,")
            .await
            .unwrap();
        handler.handle_command("prefs quick meals").await.unwrap();
        handler.handle_command("generate").await.unwrap();
        settle(&mut handler).await;

        let request = api.last_recipe_request().unwrap();
        assert_eq!(request.ingredients, vec!["chicken", "rice", ""]);
        assert_eq!(request.preferences, "quick meals");
        assert_eq!(handler.screen.recipe.suggestions(), Some("Try X"));
        assert!(!handler.screen.recipe.loading());
    }

    #[tokio::test]
    async fn generate_failure_shows_the_fixed_message() {
        let api = Arc::new(
            MockApi::new()
                .with_profile(profile())
                .with_suggestions_status(503),
        );
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler.handle_command("ingredients chicken").await.unwrap();
        handler.handle_command("generate").await.unwrap();
        settle(&mut handler).await;

        assert_eq!(handler.screen.recipe.suggestions(), Some(GENERATION_FAILED));
    }

    #[tokio::test]
    async fn generate_while_loading_is_rejected() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler.screen.recipe.set_ingredients("chicken");
        handler.screen.recipe.begin_generate().unwrap();

        handler.handle_command("generate").await.unwrap();
        assert_eq!(api.suggest_calls(), 0);
    }

    #[tokio::test]
    async fn canceled_pick_changes_nothing() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler
            .screen
            .image
            .begin_analysis(PathBuf::from("/photos/old.jpg"));
        handler
            .screen
            .image
            .finish_analysis(Ok("Old analysis".to_string()));

        handler.handle_command("upload").await.unwrap();

        assert_eq!(
            handler.screen.image.selected_image(),
            Some(Path::new("/photos/old.jpg"))
        );
        assert_eq!(handler.screen.image.analysis(), Some("Old analysis"));
        assert!(!handler.screen.image.loading());
        assert_eq!(api.analyze_calls(), 0);
    }

    #[tokio::test]
    async fn upload_encodes_and_sends_a_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let photo = temp_photo(&dir);
        let api = Arc::new(
            MockApi::new()
                .with_profile(profile())
                .with_analysis("Tomato soup"),
        );
        let mut handler = ready_handler(api.clone(), FakePicker::picking(&photo)).await;

        handler.handle_command("upload").await.unwrap();
        settle(&mut handler).await;

        let request = api.last_image_request().unwrap();
        assert!(request.image_base64.starts_with("data:image/jpeg;base64,"));
        assert_eq!(handler.screen.image.analysis(), Some("Tomato soup"));
        assert_eq!(handler.screen.image.selected_image(), Some(photo.as_path()));
    }

    #[tokio::test]
    async fn upload_unreadable_file_shows_the_fixed_message() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api.clone(), FakePicker::cancelling()).await;

        handler
            .handle_command("upload /nonexistent/basket.png")
            .await
            .unwrap();
        settle(&mut handler).await;

        assert_eq!(handler.screen.image.analysis(), Some(ANALYSIS_FAILED));
        assert_eq!(api.analyze_calls(), 0);
    }

    #[tokio::test]
    async fn upload_while_loading_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let photo = temp_photo(&dir);
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api.clone(), FakePicker::picking(&photo)).await;

        handler
            .screen
            .image
            .begin_analysis(PathBuf::from("/photos/inflight.jpg"));

        handler.handle_command("upload").await.unwrap();

        assert_eq!(
            handler.screen.image.selected_image(),
            Some(Path::new("/photos/inflight.jpg"))
        );
        assert_eq!(api.analyze_calls(), 0);
    }

    #[tokio::test]
    async fn background_completion_lands_on_the_hidden_panel() {
        let dir = tempfile::tempdir().unwrap();
        let photo = temp_photo(&dir);
        let api = Arc::new(
            MockApi::new()
                .with_profile(profile())
                .with_analysis("Tomato soup"),
        );
        let mut handler = ready_handler(api.clone(), FakePicker::picking(&photo)).await;

        handler.handle_command("upload").await.unwrap();
        handler.handle_command("tab recipe").await.unwrap();
        settle(&mut handler).await;

        assert_eq!(handler.screen.active_tab, ActiveTab::RecipeGenerator);
        assert_eq!(handler.screen.image.analysis(), Some("Tomato soup"));
    }

    #[tokio::test]
    async fn tab_commands_switch_and_validate() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api, FakePicker::cancelling()).await;

        handler.handle_command("tab image").await.unwrap();
        assert_eq!(handler.screen.active_tab, ActiveTab::ImageToRecipe);

        handler.handle_command("tab recipe").await.unwrap();
        assert_eq!(handler.screen.active_tab, ActiveTab::RecipeGenerator);

        assert!(handler.handle_command("tab pantry").await.is_err());
    }

    #[tokio::test]
    async fn bare_prefs_clears_and_bare_tab_shows_usage() {
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = ready_handler(api, FakePicker::cancelling()).await;

        handler.handle_command("prefs quick meals").await.unwrap();
        handler.handle_command("prefs").await.unwrap();
        assert!(handler.screen.recipe.preferences.is_empty());

        handler.handle_command("tab image").await.unwrap();
        handler.handle_command("tab").await.unwrap();
        assert_eq!(handler.screen.active_tab, ActiveTab::ImageToRecipe);
    }

    #[tokio::test]
    async fn signout_clears_the_session_screen() {
        let auth = CountingAuth::signed_in("ana@example.com");
        let signouts = auth.sign_out_counter();
        let api = Arc::new(MockApi::new().with_profile(profile()));
        let mut handler = handler(auth, api, FakePicker::cancelling());
        handler.refresh().await;

        handler.screen.recipe.set_ingredients("chicken");
        handler.handle_command("signout").await.unwrap();

        assert_eq!(signouts.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(handler.screen_state(), ScreenState::SignedOut);
        assert!(handler.screen.recipe.ingredients.is_empty());
    }
}
