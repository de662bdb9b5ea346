use protocol::hand::HandFrame;

use crate::mesh_model::MeshModel;

pub enum ControllerMessage {
	Frame(HandFrame),
	TogglePause,
	FrameForward,
	Reset,
	ReplaceMesh(MeshModel),
	Quit,
}
