//! Sends one plain-text email through the configured SMTP relay.

use clap::Parser;
use dotenv::dotenv;
use school_service::{
    config::MailConfig,
    mail::{Mailer, SmtpMailer},
};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "send_mail", about = "Send a plain-text email via SMTP")]
struct Args {
    /// Recipient address
    #[arg(long)]
    to: String,

    #[arg(long, default_value = "CIS 486")]
    subject: String,

    #[arg(long)]
    body: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    school_service::init_logging();

    let args = Args::parse();
    let config = MailConfig::from_env()?;
    let mailer = SmtpMailer::new(&config)?;

    if let Err(e) = mailer.send(&args.to, &args.subject, &args.body).await {
        log::error!("❌ Failed to send email: {}", e);
        return Err(e.into());
    }

    Ok(())
}
