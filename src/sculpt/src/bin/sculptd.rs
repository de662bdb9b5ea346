use std::sync::mpsc::{channel, Receiver, TryRecvError};

use log::{error, info, warn};
use protocol::pr_model::EngineStatus;
use protocol::sock::SockServer;
use protocol::Message;
use sculpt::controller_message::ControllerMessage;
use sculpt::{MeshModel, Session, SessionConfig};

/// Log every pending world update. Returns false once the session thread
/// has hung up.
fn drain_updates(rx: &Receiver<Message>, last_status: &mut Option<EngineStatus>) -> bool {
	loop {
		match rx.try_recv() {
			Ok(Message::WorldUpdate(model)) => {
				for notice in model.notices.iter() {
					warn!("{}", notice);
				}
				if *last_status != Some(model.status) {
					info!("status: {:?}", model.status);
					*last_status = Some(model.status);
				}
			}
			Ok(_) => {}
			Err(TryRecvError::Empty) => return true,
			Err(TryRecvError::Disconnected) => return false,
		}
	}
}

fn main() {
	env_logger::builder()
		.filter_level(log::LevelFilter::Info)
		.parse_default_env()
		.init();

	let mut args = std::env::args().skip(1);
	let config = match args.next() {
		Some(path) => match SessionConfig::load(&path) {
			Ok(c) => c,
			Err(e) => {
				error!("{}: {}", path, e);
				std::process::exit(1);
			}
		},
		None => SessionConfig::default(),
	};
	let socket = args.next().unwrap_or_else(|| "sculpt.socket".to_string());

	let mesh = match MeshModel::new_icosphere(3, 1.0).build() {
		Ok(m) => m,
		Err(e) => {
			error!("cannot build mesh: {}", e);
			std::process::exit(1);
		}
	};
	let tick_rate = config.tick_rate;
	let mut session = match Session::new(mesh, config) {
		Ok(s) => s,
		Err(e) => {
			error!("invalid configuration: {}", e);
			std::process::exit(1);
		}
	};
	let mut server = match SockServer::bind(&socket) {
		Ok(s) => s,
		Err(e) => {
			error!("cannot listen on {}: {}", socket, e);
			std::process::exit(1);
		}
	};
	info!("waiting for hand frames on {}", socket);

	let (tx, rx) = channel();
	let (ctx, crx) = channel();
	let handle = std::thread::spawn(move || session.run_thread(tx, crx));

	let poll = std::time::Duration::from_secs_f32(0.5 / tick_rate);
	let mut last_status = None;
	loop {
		if handle.is_finished() {
			break;
		}
		match server.poll_latest() {
			Ok(Some(frame)) => {
				if ctx.send(ControllerMessage::Frame(frame)).is_err() {
					break;
				}
			}
			Ok(None) => {}
			Err(e) => warn!("dropping producer: {}", e),
		}
		if !drain_updates(&rx, &mut last_status) {
			break;
		}
		std::thread::sleep(poll);
	}
	drop(ctx);
	if handle.join().is_err() {
		error!("session thread panicked");
		std::process::exit(1);
	}
	info!("session ended");
}

#[cfg(test)]
mod test {
	use super::*;
	use protocol::pr_model::PrModel;

	#[test]
	fn test_drain_stops_when_session_hangs_up() {
		let (tx, rx) = channel();
		let mut last_status = None;
		assert!(drain_updates(&rx, &mut last_status));
		let model = PrModel {
			status: EngineStatus::Deforming,
			..Default::default()
		};
		tx.send(Message::WorldUpdate(model)).unwrap();
		tx.send(Message::Nop).unwrap();
		assert!(drain_updates(&rx, &mut last_status));
		assert_eq!(last_status, Some(EngineStatus::Deforming));
		drop(tx);
		assert!(!drain_updates(&rx, &mut last_status));
	}
}
