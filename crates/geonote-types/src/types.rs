//! Common types used throughout geonote.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

use crate::prelude::*;

/// Text stored in place of a soft-deleted note's content
pub const REDACTED_TEXT: &str = "[deleted]";

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn from_now(delta: i64) -> Timestamp {
		Self::now().add_seconds(delta)
	}

	/// Saturates at the ends of the `i64` range
	pub fn add_seconds(self, delta: i64) -> Timestamp {
		Timestamp(self.0.saturating_add(delta))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// NoteId //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl std::fmt::Display for NoteId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Visibility //
//************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	Public,
	Private,
}

impl Visibility {
	pub fn as_str(self) -> &'static str {
		match self {
			Visibility::Public => "public",
			Visibility::Private => "private",
		}
	}

	/// Single-char storage code
	pub fn code(self) -> &'static str {
		match self {
			Visibility::Public => "P",
			Visibility::Private => "R",
		}
	}

	pub fn from_code(code: &str) -> GnResult<Self> {
		match code {
			"P" => Ok(Visibility::Public),
			"R" => Ok(Visibility::Private),
			_ => Err(Error::Parse),
		}
	}
}

// Coords //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coords {
	pub longitude: f64,
	#[serde(alias = "lattitude")]
	pub latitude: f64,
}

impl Coords {
	pub fn new(longitude: f64, latitude: f64) -> Self {
		Self { longitude, latitude }
	}

	pub fn validate(&self) -> GnResult<()> {
		if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
			return Err(Error::ValidationError("longitude must be within [-180, 180]".into()));
		}
		if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
			return Err(Error::ValidationError("latitude must be within [-90, 90]".into()));
		}
		Ok(())
	}
}

// BoundingBox //
//*************//
/// Query rectangle; membership is strict on every edge.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BoundingBox {
	pub lower_longitude: f64,
	pub upper_longitude: f64,
	#[serde(alias = "lower_lattitude")]
	pub lower_latitude: f64,
	#[serde(alias = "upper_lattitude")]
	pub upper_latitude: f64,
}

impl BoundingBox {
	pub fn validate(&self) -> GnResult<()> {
		let all = [
			self.lower_longitude,
			self.upper_longitude,
			self.lower_latitude,
			self.upper_latitude,
		];
		if all.iter().any(|v| !v.is_finite()) {
			return Err(Error::ValidationError("bounding box must be finite".into()));
		}
		if self.lower_longitude >= self.upper_longitude || self.lower_latitude >= self.upper_latitude
		{
			return Err(Error::ValidationError("bounding box lower edge must be below upper".into()));
		}
		Ok(())
	}

	pub fn contains(&self, coords: Coords) -> bool {
		coords.longitude > self.lower_longitude
			&& coords.longitude < self.upper_longitude
			&& coords.latitude > self.lower_latitude
			&& coords.latitude < self.upper_latitude
	}
}

// Note //
//******//
/// A stored note row
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
	pub note_id: NoteId,
	pub text: Box<str>,
	pub coords: Coords,
	pub owner: Box<str>,
	pub visibility: Visibility,
	pub parent_id: Option<NoteId>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
	pub deleted_at: Option<Timestamp>,
}

impl Note {
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	pub fn is_deleted(&self) -> bool {
		self.deleted_at.is_some()
	}
}

/// Outward representation of a note
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct NoteView {
	pub id: NoteId,
	pub text: Box<str>,
	pub longitude: f64,
	pub latitude: f64,
	pub owner: Box<str>,
	pub visibility: Visibility,
	pub parent_id: Option<NoteId>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
	pub deleted: bool,
	/// Only present when the viewer owns the note
	pub grantees: Option<Vec<Box<str>>>,
}

impl NoteView {
	pub fn new(note: Note, grantees: Option<Vec<Box<str>>>) -> Self {
		Self {
			id: note.note_id,
			deleted: note.is_deleted(),
			text: note.text,
			longitude: note.coords.longitude,
			latitude: note.coords.latitude,
			owner: note.owner,
			visibility: note.visibility,
			parent_id: note.parent_id,
			created_at: note.created_at,
			updated_at: note.updated_at,
			grantees,
		}
	}
}

// ApiResponse //
//*************//
/// Success envelope for every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
	pub data: T,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data }
	}
}


// vim: ts=4
