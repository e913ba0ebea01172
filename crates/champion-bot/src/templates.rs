//! Fixed message templates
//!
//! Copy is fixed; only the welcome message takes a variable, rendered with
//! MiniJinja.

use bot_core::{BotError, Result};
use minijinja::{Environment, context};

pub const WELCOME: &str = "✨ Welcome to Champion Trade - Where Your Financial Success Begins!\n\
\n\
We're delighted to have you join our community of successful traders. At Champion Trade, we understand that every trade is a step towards your financial goals, and we're here to support your journey every step of the way.\n\
\n\
Our state-of-the-art platform offers you:\n\
\n\
🔹 Real-time market intelligence with live updates\n\
🔹 Advanced charting suite with professional indicators\n\
🔹 Swift and precise trade execution\n\
🔹 Diverse portfolio opportunities across global markets\n\
🔹 Sophisticated risk management solutions\n\
🔹 Enterprise-grade security protocols\n\
🔹 Dedicated 24/7 expert assistance\n\
\n\
🚀 Try our Champion Trader telegram app now and experience trading like never before!\n\
➡️ {{ web_app_url }}\n\
\n\
Your path to financial excellence starts here. We invite you to explore our comprehensive trading environment and take the first step towards achieving your investment goals. 🌟";

pub const TRADE_PROMPT: &str = "💫 Ready to Excel in the Markets?\n\
\n\
At Champion Trade, we've crafted an exceptional trading experience that combines power with precision:\n\
\n\
• Comprehensive market analysis with real-time insights\n\
• Professional-grade charting with advanced technical tools\n\
• Seamless execution with institutional-grade speed\n\
• Global market access with diverse opportunities\n\
• Advanced risk management with protective features\n\
• Bank-level security for your peace of mind\n\
\n\
We're ready to support your trading success. Let's begin this rewarding journey together! ✨";

pub const HELP_GUIDE: &str = "🤝 We're Here to Support Your Trading Journey\n\
\n\
We understand that navigating the financial markets requires the right support at the right time. Our dedicated team is committed to ensuring your trading experience is smooth and successful.\n\
\n\
Our comprehensive Support Center provides:\n\
• Expert guidance through detailed FAQs\n\
• Professional video tutorials and trading guides\n\
• Personal assistance via live chat\n\
• Swift technical support\n\
• Round-the-clock professional assistance\n\
\n\
Your success is our priority. Click the Support button below to connect with our expert team - we're here to help you thrive! 💫";

pub const ABOUT: &str = "🌟 Champion Trade - Your Trusted Partner in Financial Markets\n\
\n\
We're committed to empowering traders with:\n\
• Professional-grade trading tools and advanced analytics\n\
• Extensive access to global financial markets\n\
• Competitive pricing and efficient execution\n\
• Industry-leading security measures\n\
• Dedicated expert support and market insights\n\
• Comprehensive educational resources\n\
\n\
Join our growing community of successful traders who have chosen Champion Trade as their trusted partner in their financial journey. Together, we'll help you achieve your trading goals. ✨";

pub const ERROR_INVALID_DATA: &str =
    "We noticed an issue with the data received. Please try your action again.";

pub const ERROR_TRADE_PROCESSING: &str =
    "We encountered a brief issue processing your trade. Please retry your transaction.";

pub const ERROR_WEB_APP: &str =
    "We apologize for the temporary disruption. Please try your request again.";

pub const UNKNOWN_WEB_APP_DATA: &str = "Received unknown data type from web app";

const WELCOME_TEMPLATE: &str = "welcome";

/// Frame around an error message reported by the web app
pub fn web_app_error(message: &str) -> String {
    format!(
        "❌ Error in web app:\n{message}\n\nPlease try again or contact support if the issue persists."
    )
}

/// Compiled templates that take variables
pub struct MessageTemplates {
    env: Environment<'static>,
}

impl MessageTemplates {
    /// Compile the templates
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(WELCOME_TEMPLATE, WELCOME)
            .map_err(|e| BotError::Template(format!("Failed to add welcome template: {e}")))?;
        Ok(Self { env })
    }

    /// Welcome message pointing at the web app
    pub fn welcome(&self, web_app_url: &str) -> Result<String> {
        let template = self
            .env
            .get_template(WELCOME_TEMPLATE)
            .map_err(|e| BotError::Template(format!("Template not found: {e}")))?;

        template
            .render(context! { web_app_url => web_app_url })
            .map_err(|e| BotError::Template(format!("Failed to render welcome: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_renders_url() {
        let templates = MessageTemplates::new().unwrap();
        let text = templates.welcome("https://t.me/champion_bot/app").unwrap();
        assert!(text.starts_with("✨ Welcome to Champion Trade"));
        assert!(text.contains("➡️ https://t.me/champion_bot/app\n\nYour path"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_templates_are_fixed_copy() {
        assert!(TRADE_PROMPT.starts_with("💫 Ready to Excel in the Markets?"));
        assert!(HELP_GUIDE.contains("Click the Support button below"));
        assert!(ABOUT.starts_with("🌟 Champion Trade"));
    }

    #[test]
    fn test_web_app_error_frame() {
        assert_eq!(
            web_app_error("Insufficient balance"),
            "❌ Error in web app:\nInsufficient balance\n\n\
             Please try again or contact support if the issue persists."
        );
    }
}
