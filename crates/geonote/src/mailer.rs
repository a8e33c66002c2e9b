//! Verification code delivery
//!
//! `SmtpMailer` sends through an SMTP relay using lettre's blocking transport on the
//! worker pool. `LogMailer` only writes the code to the log, for local setups.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, Transport};
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use geonote_types::mailer::Mailer;
use geonote_types::worker::WorkerPool;

const SUBJECT: &str = "Your geonote verification code";
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpOpts {
	pub host: Box<str>,
	/// 465 selects implicit TLS, anything else STARTTLS
	pub port: u16,
	pub username: Option<Box<str>>,
	pub password: Option<Box<str>>,
	pub from: Box<str>,
}

fn message_body(code: &str) -> String {
	format!(
		"Your verification code is: {}\n\nThe code is valid for 24 hours and can be used once.\n",
		code
	)
}

pub struct SmtpMailer {
	transport: SmtpTransport,
	from: Mailbox,
	worker: Arc<WorkerPool>,
}

impl std::fmt::Debug for SmtpMailer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SmtpMailer").field("from", &self.from).finish_non_exhaustive()
	}
}

impl SmtpMailer {
	pub fn new(opts: &SmtpOpts, worker: Arc<WorkerPool>) -> GnResult<Self> {
		let from: Mailbox = opts
			.from
			.parse()
			.map_err(|_| Error::ConfigError(format!("Invalid from address: {}", opts.from)))?;

		let builder = if opts.port == 465 {
			SmtpTransport::relay(&opts.host)
		} else {
			SmtpTransport::starttls_relay(&opts.host)
		}
		.map_err(|e| Error::ConfigError(format!("SMTP configuration error: {}", e)))?
		.port(opts.port)
		.timeout(Some(SMTP_TIMEOUT));

		let builder = match (&opts.username, &opts.password) {
			(Some(username), Some(password)) => {
				builder.credentials(Credentials::new(username.to_string(), password.to_string()))
			}
			_ => builder,
		};

		info!("SMTP mailer configured for {}:{}", opts.host, opts.port);
		Ok(Self { transport: builder.build(), from, worker })
	}
}

#[async_trait]
impl Mailer for SmtpMailer {
	async fn send_verification_code(&self, address: &str, code: &str) -> GnResult<()> {
		let to: Mailbox = address
			.parse()
			.map_err(|_| Error::ValidationError("invalid email address".into()))?;
		let email = Message::builder()
			.from(self.from.clone())
			.to(to)
			.subject(SUBJECT)
			.body(message_body(code))
			.map_err(|e| Error::Internal(format!("Failed to build email: {}", e)))?;

		let transport = self.transport.clone();
		let address = address.to_string();
		self.worker
			.try_run(move || match transport.send(&email) {
				Ok(response) => {
					debug!("Email sent to {} (response: {:?})", address, response.code());
					Ok(())
				}
				Err(e) => {
					warn!("Failed to send email to {}: {}", address, e);
					Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
				}
			})
			.await
	}
}

/// Writes verification codes to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
	async fn send_verification_code(&self, address: &str, code: &str) -> GnResult<()> {
		info!(address = address, code = code, "Verification code (no SMTP configured)");
		Ok(())
	}
}


// vim: ts=4
