use clap::Args;
use serde_json::json;

use crate::auth::TokenCodec;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Subject (user id) the token is issued to")]
    pub subject: String,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,

    #[arg(long, help = "Role claim, e.g. admin")]
    pub role: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let codec = TokenCodec::from_config(config)?;
    let token = codec.issue(args.subject.clone(), args.email, args.role.clone())?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "token": token,
                "subject": args.subject,
                "role": args.role,
                "expires_in_hours": config.security.jwt_expiry_hours,
            })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
