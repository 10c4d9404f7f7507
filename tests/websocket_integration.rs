// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the WebSocket transport against a local fake unit.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ecostream_lib::command::{BypassCommand, FanSpeedCommand};
use ecostream_lib::state::fields;
use ecostream_lib::{Ecostream, Error};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

enum Push {
    Frame(Value),
    Drop,
}

struct Shared {
    snapshot: Value,
    pushes: Mutex<mpsc::UnboundedReceiver<Push>>,
    received: parking_lot::Mutex<Vec<Value>>,
    connections: AtomicUsize,
}

/// A local stand-in for a unit: greets every connection with a snapshot,
/// echoes commands back, and pushes frames on request.
struct FakeUnit {
    addr: SocketAddr,
    push: mpsc::UnboundedSender<Push>,
    shared: Arc<Shared>,
}

impl FakeUnit {
    async fn start(snapshot: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (push, pushes) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            snapshot,
            pushes: Mutex::new(pushes),
            received: parking_lot::Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
        });

        let accept_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&accept_shared)));
            }
        });

        Self { addr, push, shared }
    }

    fn host(&self) -> String {
        self.addr.to_string()
    }

    fn push(&self, frame: Value) {
        self.push.send(Push::Frame(frame)).unwrap();
    }

    fn drop_connection(&self) {
        self.push.send(Push::Drop).unwrap();
    }

    fn received(&self) -> Vec<Value> {
        self.shared.received.lock().clone()
    }

    fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }
}

async fn serve(stream: TcpStream, unit: Arc<Shared>) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };
    // One connection at a time owns the push queue.
    let mut pushes = unit.pushes.lock().await;
    unit.connections.fetch_add(1, Ordering::SeqCst);
    if ws.send(Message::text(unit.snapshot.to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = ws.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let Ok(command) = serde_json::from_str::<Value>(text.as_str()) else {
                        continue;
                    };
                    unit.received.lock().push(command);
                    if ws.send(Message::text(text.as_str().to_owned())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            push = pushes.recv() => match push {
                Some(Push::Frame(frame)) => {
                    if ws.send(Message::text(frame.to_string())).await.is_err() {
                        break;
                    }
                }
                Some(Push::Drop) => {
                    let _ = ws.close(None).await;
                    break;
                }
                None => break,
            },
        }
    }
}

fn unit1() -> Value {
    json!({
        "comm_wifi": {"ssid": "home", "rssi": -61},
        "system": {"system_name": "Unit1", "uptime": 1200},
        "config": {"capacity_min": 50, "capacity_max": 350, "man_override_bypass": 100},
        "status": {"qset": 140, "bypass_pos": 50}
    })
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connects_and_reads_identity() {
        let fake = FakeUnit::start(unit1()).await;

        let (unit, initial) = Ecostream::builder(&fake.host())
            .build_without_polling()
            .await
            .unwrap();

        assert_eq!(unit.identity().unique_id(), "Unit1");
        assert_eq!(initial.number(&fields::QSET), Some(140.0));
        assert_eq!(initial.integer(&fields::WIFI_RSSI), Some(-61));
        unit.shutdown().await;
    }

    #[tokio::test]
    async fn probe_unreachable_host_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = Ecostream::builder(&addr.to_string())
            .with_connect_timeout(Duration::from_secs(2))
            .probe()
            .await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn reconnects_after_unit_drops_connection() {
        let fake = FakeUnit::start(unit1()).await;
        let (unit, _) = Ecostream::builder(&fake.host())
            .build_without_polling()
            .await
            .unwrap();

        fake.drop_connection();
        let state = unit.refresh().await.unwrap();

        // The new connection greets with the snapshot again
        assert_eq!(state.system_name(), Some("Unit1"));
        assert_eq!(fake.connections(), 2);
        unit.shutdown().await;
    }
}

// ============================================================================
// Data flow
// ============================================================================

mod data_flow {
    use super::*;

    #[tokio::test]
    async fn refresh_merges_pushed_frame() {
        let fake = FakeUnit::start(unit1()).await;
        let (unit, _) = Ecostream::builder(&fake.host())
            .build_without_polling()
            .await
            .unwrap();

        fake.push(json!({"status": {"qset": 200, "sensor_temp_oda": 8.5}}));
        let state = unit.refresh().await.unwrap();

        assert_eq!(state.number(&fields::QSET), Some(200.0));
        assert_eq!(state.number(&fields::SENSOR_TEMP_ODA), Some(8.5));
        assert_eq!(state.number(&fields::BYPASS_POS), Some(50.0));
        unit.shutdown().await;
    }

    #[tokio::test]
    async fn bypass_close_round_trip() {
        let fake = FakeUnit::start(unit1()).await;
        let (unit, _) = Ecostream::builder(&fake.host())
            .build_without_polling()
            .await
            .unwrap();

        let state = unit.execute(&BypassCommand::close()).await.unwrap();

        assert_eq!(state.integer(&fields::MAN_OVERRIDE_BYPASS), Some(0));
        assert_eq!(
            fake.received(),
            vec![json!({"config": {"man_override_bypass": 0, "man_override_bypass_time": 0}})]
        );
        unit.shutdown().await;
    }

    #[tokio::test]
    async fn fan_override_round_trip() {
        let fake = FakeUnit::start(unit1()).await;
        let (unit, _) = Ecostream::builder(&fake.host())
            .with_follow_up_delay(Duration::from_secs(60))
            .build_without_polling()
            .await
            .unwrap();

        let state = unit.execute(&FanSpeedCommand::new(250)).await.unwrap();

        assert_eq!(state.integer(&fields::MAN_OVERRIDE_SET), Some(250));
        assert_eq!(state.integer(&fields::MAN_OVERRIDE_SET_TIME), Some(1800));
        unit.shutdown().await;
    }
}
