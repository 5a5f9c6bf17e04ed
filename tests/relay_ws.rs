mod support;

use serde_json::json;
use support::{TestClient, spawn_server};

#[tokio::test]
async fn init_contains_new_player_and_obstacles() {
    let addr = spawn_server().await;
    let (_client, id, init) = TestClient::join(addr).await;

    let me = &init["data"]["players"][&id];
    assert_eq!(me["health"], 100);
    assert_eq!(me["nickname"], "");
    assert_eq!(me["color"], 0x00ff00);
    assert_eq!(me["rotY"], 0.0);
    assert!((me["y"].as_f64().expect("y") - 1.8).abs() < 1e-6);
    for axis in ["x", "z"] {
        let v = me[axis].as_f64().expect("coordinate");
        assert!(v.abs() <= 22.5, "{axis} outside spawn bounds: {v}");
    }

    let obstacles = init["data"]["obstacles"].as_array().expect("obstacles");
    assert_eq!(obstacles.len(), 2);
    assert_eq!(
        obstacles[0],
        json!({"x": 10.0, "y": 2.5, "z": 10.0, "width": 5.0, "height": 5.0, "depth": 5.0})
    );
}

#[tokio::test]
async fn nickname_is_announced_to_others_and_kept_for_late_joiners() {
    let addr = spawn_server().await;
    let (mut alice_view, _a, _) = TestClient::join(addr).await;
    let (mut bob, bob_id, _) = TestClient::join(addr).await;

    bob.send(json!({"type": "set-nickname", "data": {"nickname": "Alice"}}))
        .await;

    let announced = alice_view.recv().await;
    assert_eq!(announced["type"], "new-player");
    assert_eq!(announced["data"]["id"], bob_id.as_str());
    assert_eq!(announced["data"]["data"]["nickname"], "Alice");
    bob.expect_silence().await;

    let (_late, _, init) = TestClient::join(addr).await;
    assert_eq!(init["data"]["players"][&bob_id]["nickname"], "Alice");
}

#[tokio::test]
async fn move_is_relayed_to_everyone_but_the_mover() {
    let addr = spawn_server().await;
    let (mut mover, mover_id, _) = TestClient::join(addr).await;
    let (mut observer, _, _) = TestClient::join(addr).await;

    mover
        .send(json!({"type": "move", "data": {"x": 1, "y": 2, "z": 3, "rotY": 0.5}}))
        .await;

    let update = observer.recv().await;
    assert_eq!(update["type"], "update-player");
    assert_eq!(update["data"]["id"], mover_id.as_str());
    let data = &update["data"]["data"];
    assert_eq!(
        (&data["x"], &data["y"], &data["z"], &data["rotY"]),
        (&json!(1.0), &json!(2.0), &json!(3.0), &json!(0.5))
    );
    mover.expect_silence().await;
}

#[tokio::test]
async fn shot_updates_target_health_for_all_and_announces_shooter() {
    let addr = spawn_server().await;
    let (mut shooter, shooter_id, _) = TestClient::join(addr).await;
    let (mut target, target_id, _) = TestClient::join(addr).await;

    shooter
        .send(json!({"type": "shoot", "data": {"hitPlayerId": target_id}}))
        .await;

    for client in [&mut shooter, &mut target] {
        let update = client.recv().await;
        assert_eq!(update["type"], "update-player");
        assert_eq!(update["data"]["id"], target_id.as_str());
        assert_eq!(update["data"]["data"]["health"], 80);

        let fired = client.recv().await;
        assert_eq!(
            fired,
            json!({"type": "player-fired", "data": {"shooterId": shooter_id}})
        );
    }
}

#[tokio::test]
async fn fifth_hit_removes_target() {
    let addr = spawn_server().await;
    let (mut shooter, shooter_id, _) = TestClient::join(addr).await;
    let (_target, target_id, _) = TestClient::join(addr).await;

    for _ in 0..5 {
        shooter
            .send(json!({"type": "shoot", "data": {"hitPlayerId": target_id}}))
            .await;
    }

    for expected in [80, 60, 40, 20] {
        let update = shooter.recv().await;
        assert_eq!(update["data"]["data"]["health"], expected);
        assert_eq!(shooter.recv().await["type"], "player-fired");
    }
    assert_eq!(
        shooter.recv().await,
        json!({"type": "remove-player", "data": target_id})
    );
    assert_eq!(
        shooter.recv().await,
        json!({"type": "player-fired", "data": {"shooterId": shooter_id}})
    );
}

#[tokio::test]
async fn shot_without_target_only_announces_shooter() {
    let addr = spawn_server().await;
    let (mut shooter, shooter_id, _) = TestClient::join(addr).await;
    let (mut other, _, _) = TestClient::join(addr).await;

    shooter.send(json!({"type": "shoot", "data": {}})).await;
    shooter
        .send(json!({"type": "shoot", "data": {"hitPlayerId": "999999"}}))
        .await;

    for client in [&mut shooter, &mut other] {
        for _ in 0..2 {
            assert_eq!(
                client.recv().await,
                json!({"type": "player-fired", "data": {"shooterId": shooter_id}})
            );
        }
    }
}

#[tokio::test]
async fn disconnect_removes_player_for_remaining_clients() {
    let addr = spawn_server().await;
    let (leaver, leaver_id, _) = TestClient::join(addr).await;
    let (mut stayer, stayer_id, _) = TestClient::join(addr).await;

    leaver.close().await;

    assert_eq!(
        stayer.recv().await,
        json!({"type": "remove-player", "data": leaver_id})
    );
    stayer.expect_silence().await;

    let (_late, _, init) = TestClient::join(addr).await;
    let players = init["data"]["players"].as_object().expect("players map");
    assert!(!players.contains_key(&leaver_id));
    assert!(players.contains_key(&stayer_id));
}

#[tokio::test]
async fn malformed_messages_are_dropped_without_closing_the_connection() {
    let addr = spawn_server().await;
    let (mut sender, sender_id, _) = TestClient::join(addr).await;
    let (mut observer, _, _) = TestClient::join(addr).await;

    sender.send_raw("not json").await;
    sender
        .send(json!({"type": "move", "data": {"x": 1}}))
        .await;
    sender
        .send(json!({"type": "set-nickname", "data": {"nickname": "x".repeat(33)}}))
        .await;
    sender
        .send(json!({"type": "move", "data": {"x": 4, "y": 5, "z": 6, "rotY": 1}}))
        .await;

    let update = observer.recv().await;
    assert_eq!(update["type"], "update-player");
    assert_eq!(update["data"]["id"], sender_id.as_str());
    assert_eq!(update["data"]["data"]["x"], 4.0);
    observer.expect_silence().await;
}

#[tokio::test]
async fn blank_nickname_is_still_announced() {
    let addr = spawn_server().await;
    let (mut observer, _, _) = TestClient::join(addr).await;
    let (mut player, player_id, _) = TestClient::join(addr).await;

    player
        .send(json!({"type": "set-nickname", "data": {"nickname": "   "}}))
        .await;

    let announced = observer.recv().await;
    assert_eq!(announced["type"], "new-player");
    assert_eq!(announced["data"]["id"], player_id.as_str());
    assert_eq!(announced["data"]["data"]["nickname"], "");
}

#[tokio::test]
async fn too_many_unparseable_messages_close_with_policy_violation() {
    let addr = spawn_server().await;
    let (mut offender, offender_id, _) = TestClient::join(addr).await;
    let (mut observer, _, _) = TestClient::join(addr).await;

    // Ten are tolerated; the eleventh crosses the limit.
    for _ in 0..10 {
        offender.send_raw("{not json").await;
    }
    offender.expect_silence().await;
    offender.send_raw("{not json").await;

    offender.expect_close(1008).await;
    assert_eq!(
        observer.recv().await,
        json!({"type": "remove-player", "data": offender_id})
    );
}

#[tokio::test]
async fn binary_frame_closes_with_unsupported_data() {
    let addr = spawn_server().await;
    let (mut sender, sender_id, _) = TestClient::join(addr).await;
    let (mut observer, _, _) = TestClient::join(addr).await;

    sender.send_binary(vec![1, 2, 3]).await;

    sender.expect_close(1003).await;
    assert_eq!(
        observer.recv().await,
        json!({"type": "remove-player", "data": sender_id})
    );
}

#[tokio::test]
async fn abrupt_drop_still_removes_player() {
    let addr = spawn_server().await;
    let (dropper, dropper_id, _) = TestClient::join(addr).await;
    let (mut stayer, _, _) = TestClient::join(addr).await;

    dropper.abort();

    assert_eq!(
        stayer.recv().await,
        json!({"type": "remove-player", "data": dropper_id})
    );
    stayer.expect_silence().await;
}
