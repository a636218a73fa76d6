//! Prompt templates and fallback copy

/// DriveBot persona for the support chat
pub const DRIVEBOT_SYSTEM: &str = "You are DriveBot, a helpful and friendly AI assistant for the DriveEasy car rental platform.
Your goal is to help customers find cars, understand rental policies, and feel confident about their booking.
- Be concise and polite.
- You can suggest car categories (SUV, Sedan, Luxury, Sports).
- If asked about prices, give a general range ($50 - $500/day).
- If asked about support, tell them to email support@driveeasy.com.";

/// Reply shown when the chat backend cannot be reached
pub const CHAT_FALLBACK: &str =
    "I'm having trouble connecting to the server right now. Please try again later.";

/// Description used when the model answers with nothing
pub const EMPTY_DESCRIPTION: &str = "A great car for your next trip.";

/// Listing copy prompt
#[must_use]
pub fn description_prompt(name: &str, model_year: i32, category: &str) -> String {
    format!(
        "Write a short, appealing marketing description (max 2 sentences) for a car rental listing.\n\
         Car: {model_year} {name}. Category: {category}.\n\
         Focus on comfort, style, or performance based on category."
    )
}

/// Description used when generation fails
#[must_use]
pub fn description_fallback(name: &str, model_year: i32) -> String {
    format!("Enjoy your ride with this {model_year} {name}.")
}

/// Prompt asking for a one-sentence video generator prompt
#[must_use]
pub fn video_script_prompt(name: &str, category: &str) -> String {
    format!(
        "Write a short, highly visual prompt for an AI video generator to create a cinematic commercial for a {name} ({category}).\n\
         Describe camera angles, lighting, and environment. Max 1 sentence."
    )
}

/// Video script used when generation fails or is empty
#[must_use]
pub fn video_script_fallback(name: &str) -> String {
    format!("Cinematic shot of a {name} driving on a scenic road.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_name_the_car() {
        assert_eq!(
            description_fallback("Tesla Model 3", 2023),
            "Enjoy your ride with this 2023 Tesla Model 3."
        );
        assert_eq!(
            video_script_fallback("Porsche 911 Carrera"),
            "Cinematic shot of a Porsche 911 Carrera driving on a scenic road."
        );
    }

    #[test]
    fn description_prompt_includes_category() {
        let prompt = description_prompt("Range Rover Sport", 2022, "SUV");
        assert!(prompt.contains("2022 Range Rover Sport"));
        assert!(prompt.contains("Category: SUV"));
    }
}
