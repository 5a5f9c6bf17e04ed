use crate::domain::ConnectionId;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, ServerEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    RelayClosed,
    SendTimeout,
    JoinRejected,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match bootstrap_connection(&state).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: "relay unavailable".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    let span = info_span!("conn", conn_id = ctx.conn_id);
    async move {
        info!("client connected");

        // Main Client Loop
        if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
            warn!(error = ?e, "client loop exited with error");
        }
    }
    .instrument(span)
    .await
}

async fn send_message<S>(
    socket: &mut S,
    msg: &ServerMessage,
    send_timeout: Duration,
) -> Result<usize, NetError>
where
    S: Sink<Message, Error = Error> + Unpin,
{
    // Serialize message safely; log JSON errors instead of panicking
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    timeout(send_timeout, socket.send(Message::Text(txt.into())))
        .await
        .map_err(|_| NetError::SendTimeout)?
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub conn_id: ConnectionId,
    pub input_tx: mpsc::Sender<GameEvent>,
    // Events the relay queued for this connection.
    pub outbox_rx: mpsc::Receiver<Arc<ServerEvent>>,
    pub send_timeout: Duration,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,
    pub rejected_commands: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn bootstrap_connection(state: &AppState) -> Result<ConnCtx, NetError> {
    // The outbox exists before Join so `init` is the first thing it ever holds.
    let (outbox, outbox_rx) = mpsc::channel(state.outbox_capacity);
    let (reply, reply_rx) = oneshot::channel();

    // Notify Relay Task
    // It allocates the id, spawns the player and queues the snapshot.
    state
        .input_tx
        .send(GameEvent::Join { outbox, reply })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let conn_id = reply_rx.await.map_err(|_| NetError::JoinRejected)?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        conn_id,
        input_tx: state.input_tx.clone(),
        outbox_rx,
        send_timeout: state.send_timeout,

        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,

        invalid_json: 0,
        rejected_commands: 0,

        last_input_full_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

fn forward_command(
    conn_id: ConnectionId,
    input_tx: &mpsc::Sender<GameEvent>,
    event: GameEvent,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match input_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!(conn_id, "input channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let conn_id = ctx.conn_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        outbox_rx,
        send_timeout,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        rejected_commands,
        last_input_full_log,
        last_invalid_input_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    conn_id,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    rejected_commands,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing Relay Event
            event = outbox_rx.recv() => {
                match event {
                    Some(event) => {
                        match forward_event(&event, socket, *send_timeout, msgs_out, bytes_out).await {
                            LoopControl::Continue => false,
                            LoopControl::Disconnect => true,
                        }
                    }
                    None => {
                        // The relay dropped our outbox; it is shutting down.
                        *close_frame = Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: "server shutting down".into(),
                        });
                        fatal = Some(NetError::RelayClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        conn_id,
        input_tx,
        relay_expects_leave(fatal.as_ref()),
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *rejected_commands,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    conn_id: ConnectionId,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    rejected_commands: &mut u32,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                let parsed = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => parsed,
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                conn_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        return Ok(LoopControl::Continue);
                    }
                };

                match parsed.into_game_event(conn_id) {
                    Ok(event) => forward_command(conn_id, input_tx, event, last_input_full_log),
                    Err(reason) => {
                        *rejected_commands += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(conn_id, ?reason, "invalid command payload; dropping");
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(conn_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(conn_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_event<S>(
    event: &ServerEvent,
    socket: &mut S,
    send_timeout: Duration,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl
where
    S: Sink<Message, Error = Error> + Unpin,
{
    let msg = ServerMessage::from(event);
    match send_message(socket, &msg, send_timeout).await {
        Ok(bytes) => {
            *msgs_out += 1;
            *bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send relay event");
            LoopControl::Disconnect
        }
    }
}

// A relay that closed our outbox has already dropped its connection table.
fn relay_expects_leave(fatal: Option<&NetError>) -> bool {
    !matches!(fatal, Some(NetError::RelayClosed))
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    conn_id: ConnectionId,
    input_tx: &mpsc::Sender<GameEvent>,
    send_leave: bool,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    rejected_commands: u32,
) -> Result<(), NetError> {
    // Tell the relay whatever ended the connection, unless it is already gone.
    if send_leave {
        input_tx
            .send(GameEvent::Leave { conn_id })
            .await
            .map_err(|_| NetError::InputClosed)?;
    }

    debug!(
        conn_id,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        rejected_commands,
        "connection stats"
    );
    info!(conn_id, "client disconnected");
    Ok(())
}
