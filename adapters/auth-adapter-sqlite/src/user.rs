//! User accounts

use sqlx::{Row, SqlitePool};

use crate::crypto;
use crate::utils::*;
use crate::verification;
use geonote::auth_adapter::CreateUserData;
use geonote::prelude::*;
use geonote::worker::WorkerPool;

pub(crate) async fn create(
	db: &SqlitePool,
	worker: &WorkerPool,
	data: CreateUserData<'_>,
) -> GnResult<()> {
	let password_hash = crypto::generate_password_hash(worker, data.password.into()).await?;

	// Code and account commit together; dropping the transaction rolls both back
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	if let Some(code) = data.email_code {
		let Some(email) = data.email else {
			return Err(Error::ValidationError("verification code requires an email".into()));
		};
		verification::consume(&mut *tx, email, code).await?;
	}

	let res = sqlx::query("INSERT INTO users (id_tag, email, password) VALUES (?1, ?2, ?3)")
		.bind(data.id_tag)
		.bind(data.email)
		.bind(password_hash.as_ref())
		.execute(&mut *tx)
		.await;

	match res {
		Ok(_) => {
			tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
			info!(id_tag = data.id_tag, "User created");
			Ok(())
		}
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
			if err.message().contains("users.email") {
				Err(Error::Conflict("email already registered".into()))
			} else {
				Err(Error::Conflict("username already taken".into()))
			}
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) async fn exists(db: &SqlitePool, id_tag: &str) -> GnResult<bool> {
	sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id_tag = ?1)")
		.bind(id_tag)
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))
}

pub(crate) async fn check_password(
	db: &SqlitePool,
	worker: &WorkerPool,
	id_tag: &str,
	password: &str,
) -> GnResult<()> {
	let res = sqlx::query("SELECT password FROM users WHERE id_tag = ?1")
		.bind(id_tag)
		.fetch_one(db)
		.await;
	let password_hash: String = match map_res(res, |row| row.try_get("password")) {
		Ok(hash) => hash,
		Err(Error::NotFound) => {
			debug!(id_tag = id_tag, "Login for unknown user");
			return Err(AuthError::InvalidCredentials.into());
		}
		Err(err) => return Err(err),
	};

	crypto::check_password(worker, password.into(), password_hash.into()).await
}

// vim: ts=4
