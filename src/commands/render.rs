use colored::Colorize;

use crate::api::UserProfile;
use crate::screen::{ActiveTab, ImagePanel, RecipePanel};

pub fn loading_screen() {
    println!("\n⏳ {}", "Loading Smart Recipe AI...".cyan());
}

pub fn welcome_screen() {
    println!();
    println!("🧠 {}", "Smart Recipe & Health Assistant AI".bright_cyan().bold());
    println!("Get personalized recipe recommendations based on your health and available ingredients");
    println!();
    println!("  signin  - Get Started");
    println!("  exit    - Exit the program");
}

pub fn profile_setup_screen() {
    println!();
    println!("{} 🧠", "Welcome to Smart Recipe AI!".bright_cyan().bold());
    println!("Complete your health profile to get personalized recommendations");
    println!(
        "{}",
        "Please complete your profile setup on the web version first.".yellow()
    );
    println!();
    println!("  signout - Sign out");
    println!("  exit    - Exit the program");
}

pub fn header(name: &str) {
    println!();
    println!("🧠 {}", "Smart Recipe AI".bright_cyan().bold());
    println!("Welcome back, {}", name.bright_yellow());
}

pub fn profile_card(profile: Option<&UserProfile>) {
    let Some(profile) = profile else {
        println!("No health profile on record.");
        return;
    };
    println!();
    println!("📋 {}", "Your Health Profile".bold());
    println!("  Health Conditions: {}", profile.conditions_summary().bright_green());
    println!("  Food Preferences: {}", profile.preferences_summary().bright_green());
    println!("  Allergies: {}", profile.allergies_summary().bright_green());
}

pub fn tab_bar(active: ActiveTab) {
    let recipe = ActiveTab::RecipeGenerator.label();
    let image = ActiveTab::ImageToRecipe.label();
    println!();
    match active {
        ActiveTab::RecipeGenerator => {
            println!("  [{}]  {}", recipe.bright_cyan().bold(), image.dimmed())
        }
        ActiveTab::ImageToRecipe => {
            println!("  {}  [{}]", recipe.dimmed(), image.bright_cyan().bold())
        }
    }
}

pub fn recipe_panel(panel: &RecipePanel) {
    println!();
    println!("🍳 {}", "Smart Recipe Generator".bold());
    if panel.ingredients.is_empty() {
        println!(
            "  Available Ingredients (comma-separated): {}",
            "e.g., chicken, spinach, rice, tomatoes".dimmed()
        );
    } else {
        println!(
            "  Available Ingredients (comma-separated): {}",
            panel.ingredients.bright_yellow()
        );
    }
    if panel.preferences.is_empty() {
        println!(
            "  Additional Preferences (optional): {}",
            "e.g., quick meals, low sodium, spicy".dimmed()
        );
    } else {
        println!(
            "  Additional Preferences (optional): {}",
            panel.preferences.bright_yellow()
        );
    }
    if panel.loading() {
        println!("  ⏳ Generating smart recipes...");
    }
    if let Some(suggestions) = panel.suggestions() {
        println!();
        println!("🍽️ {}", "AI Recipe Suggestions:".bold());
        println!("{}", suggestions.truecolor(255, 236, 179));
    }
}

pub fn image_panel(panel: &ImagePanel) {
    println!();
    println!("📷 {}", "Upload Ingredient Photo".bold());
    match panel.selected_image() {
        Some(path) => println!("  Selected: {}", path.display().to_string().bright_yellow()),
        None => println!(
            "  {}",
            "'upload' opens a file picker; 'upload <path>' analyzes a file directly".dimmed()
        ),
    }
    if panel.loading() {
        println!("  🔍 Analyzing image...");
    }
    if let Some(analysis) = panel.analysis() {
        println!();
        println!("🍽️ {}", "AI Analysis & Recipe Suggestions:".bold());
        println!("{}", analysis.truecolor(255, 236, 179));
    }
}

pub fn background_notice(tab: ActiveTab) {
    println!(
        "{}",
        format!(
            "💡 Results are ready on the {} tab. Type 'tab {}' to view them.",
            tab.label(),
            tab.command()
        )
        .dimmed()
    );
}
