use crate::screen::ScreenState;

pub fn handle_command(input: &str, state: ScreenState) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            show_help(state);
            Ok(())
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}

fn show_help(state: ScreenState) {
    match state {
        ScreenState::Loading => {
            println!("\n⏳ Still loading. 'exit' to quit.");
        }
        ScreenState::SignedOut => {
            println!("\n🔑 Account Commands:");
            println!("  signin  - Sign in to Smart Recipe AI");
            println!();
            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
        }
        ScreenState::ProfileSetup => {
            println!("\n📋 Your health profile is not set up yet.");
            println!("  Complete it on the web version, then sign back in.");
            println!();
            println!("🔑 Account Commands:");
            println!("  signout - Sign out");
            println!();
            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
        }
        ScreenState::Ready => {
            println!("\n🍳 Recipe Commands:");
            println!("  ingredients <list>  - Set available ingredients (comma-separated)");
            println!("  prefs <text>        - Set additional preferences (optional)");
            println!("  prefs               - Clear the preferences");
            println!("  generate            - Generate Smart Recipes");
            println!("  Example: ingredients chicken, spinach, rice, tomatoes");
            println!();
            println!("📷 Image Commands:");
            println!("  upload          - Pick an ingredient photo with the file dialog");
            println!("  upload <path>   - Analyze an image file directly");
            println!();
            println!("🗂️ Tab Commands:");
            println!("  tab recipe  - Show the Recipe Generator tab");
            println!("  tab image   - Show the Image to Recipe tab");
            println!("  show        - Redraw the current screen");
            println!();
            println!("👤 Account Commands:");
            println!("  profile - Show your health profile");
            println!("  signout - Sign out");
            println!();
            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
        }
    }
}
