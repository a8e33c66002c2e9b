use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use geonote::error::{Error, GnResult};
use geonote::mailer::{SmtpMailer, SmtpOpts};
use geonote::worker::WorkerPool;
use geonote_auth_adapter_sqlite::AuthAdapterSqlite;
use geonote_meta_adapter_sqlite::MetaAdapterSqlite;
use tracing::error;

pub struct Config {
	pub listen: String,
	pub db_dir: PathBuf,
	pub dist_dir: PathBuf,
	pub session_ttl: i64,
	pub storage_timeout: Duration,
	pub jwt_secret: Option<String>,
	pub require_email_verification: bool,
	pub login_failure_delay: Duration,
	pub smtp: Option<SmtpOpts>,
	pub workers: usize,
}

fn var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> GnResult<T> {
	match var(name) {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| Error::ConfigError(format!("{} has an invalid value: {}", name, value))),
		None => Ok(default),
	}
}

fn parse_bool(name: &str) -> GnResult<bool> {
	match var(name).as_deref().map(str::trim) {
		None => Ok(false),
		Some("1" | "true" | "yes" | "on") => Ok(true),
		Some("0" | "false" | "no" | "off") => Ok(false),
		Some(value) => Err(Error::ConfigError(format!("{} must be a boolean: {}", name, value))),
	}
}

impl Config {
	fn from_env() -> GnResult<Self> {
		let smtp = match var("SMTP_HOST") {
			Some(host) => Some(SmtpOpts {
				host: host.into(),
				port: parse_var("SMTP_PORT", 587)?,
				username: var("SMTP_USER").map(Into::into),
				password: var("SMTP_PASSWORD").map(Into::into),
				from: var("SMTP_FROM")
					.ok_or_else(|| Error::ConfigError("SMTP_FROM is required with SMTP_HOST".into()))?
					.into(),
			}),
			None => None,
		};

		Ok(Config {
			listen: var("LISTEN").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
			db_dir: PathBuf::from(var("DB_DIR").unwrap_or_else(|| "./data".to_string())),
			dist_dir: PathBuf::from(var("DIST_DIR").unwrap_or_else(|| "./dist".to_string())),
			session_ttl: parse_var("SESSION_TTL_SECS", 86400)?,
			storage_timeout: Duration::from_millis(parse_var("STORAGE_TIMEOUT_MS", 5000)?),
			jwt_secret: var("JWT_SECRET"),
			require_email_verification: parse_bool("REQUIRE_EMAIL_VERIFICATION")?,
			login_failure_delay: Duration::from_millis(parse_var("LOGIN_FAILURE_DELAY_MS", 1000)?),
			smtp,
			workers: parse_var("WORKERS", 2)?,
		})
	}
}

async fn run() -> GnResult<()> {
	let config = Config::from_env()?;
	tokio::fs::create_dir_all(&config.db_dir).await?;

	let worker = Arc::new(WorkerPool::new(1, config.workers.max(1)));
	let auth_adapter =
		Arc::new(AuthAdapterSqlite::new(worker.clone(), config.db_dir.join("auth.db")).await?);
	let note_adapter = Arc::new(MetaAdapterSqlite::new(config.db_dir.join("notes.db")).await?);

	let mut builder = geonote::AppBuilder::new();
	builder
		.listen(config.listen)
		.dist_dir(config.dist_dir)
		.session_ttl(config.session_ttl)
		.storage_timeout(config.storage_timeout)
		.require_email_verification(config.require_email_verification)
		.login_failure_delay(config.login_failure_delay)
		.worker(worker.clone())
		.auth_adapter(auth_adapter.clone())
		.revocation_ledger(auth_adapter)
		.note_adapter(note_adapter);
	if let Some(secret) = config.jwt_secret {
		builder.session_secret(secret);
	}
	if let Some(smtp) = &config.smtp {
		builder.mailer(Arc::new(SmtpMailer::new(smtp, worker)?));
	}

	builder.run().await
}

#[tokio::main]
async fn main() -> GnResult<()> {
	run().await.inspect_err(|e| error!("FATAL: {}", e))
}

// vim: ts=4
