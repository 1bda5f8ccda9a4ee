use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Base URL of the hosted inference Space
    #[arg(
        long,
        env = "SPACE_URL",
        default_value = "https://juppy44-plant-classification.hf.space"
    )]
    pub space_url: String,

    /// Named prediction operation exposed by the Space
    #[arg(long, env = "API_NAME", default_value = "classify_plant")]
    pub api_name: String,

    /// Model identifier advertised in classification responses
    #[arg(
        long,
        env = "MODEL_NAME",
        default_value = "juppy44/plant-identification-2m-vit-b-wa"
    )]
    pub model_name: String,
}

impl Config {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
