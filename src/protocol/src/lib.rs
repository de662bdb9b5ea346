pub mod hand;
pub mod pr_model;
pub mod sock;

use hand::HandFrame;
use pr_model::PrModel;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Message {
	Frame(HandFrame),
	WorldUpdate(PrModel),
	Nop,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
	#[error("cannot encode message: {0}")]
	Encode(bincode::Error),
	#[error("cannot decode message: {0}")]
	Decode(bincode::Error),
	#[error("frame of {0} bytes exceeds the {max} byte limit", max = sock::MAX_FRAME)]
	Oversize(usize),
	#[error("socket: {0}")]
	Io(#[from] std::io::Error),
}

impl Message {
	pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
		bincode::serialize(&self).map_err(ProtocolError::Encode)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
		bincode::deserialize(bytes).map_err(ProtocolError::Decode)
	}
}
