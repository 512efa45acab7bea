use std::env;

/// Identity of the product this deployment serves. Every stored key is
/// namespaced under `slug`, so one binary can never read another product's
/// records.
#[derive(Debug, Clone)]
pub struct ProductConfig {
    pub name: String,
    pub slug: String,
    pub model: String,
    pub system_prompt: String,
    pub upgrade_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub dev_mode: bool,
    pub product: ProductConfig,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_url: String,
    pub stripe_price_monthly: Option<String>,
    pub stripe_price_yearly: Option<String>,
    pub resend_api_key: Option<String>,
    pub email_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("GATECHECK_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let product = ProductConfig {
            name: env::var("PRODUCT_NAME").unwrap_or_else(|_| "Gatecheck".to_string()),
            slug: env::var("PRODUCT_SLUG").unwrap_or_else(|_| "gatecheck".to_string()),
            model: env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            system_prompt: env::var("SYSTEM_PROMPT")
                .unwrap_or_else(|_| "You are a helpful writing assistant.".to_string()),
            upgrade_url: env::var("UPGRADE_URL").unwrap_or_else(|_| "/#pricing".to_string()),
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "gatecheck.db".to_string()),
            base_url,
            dev_mode,
            product,
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            stripe_api_url: env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            stripe_price_monthly: env::var("STRIPE_PRICE_ID_MONTHLY").ok(),
            stripe_price_yearly: env::var("STRIPE_PRICE_ID_YEARLY").ok(),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "login@gatecheck.app".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
