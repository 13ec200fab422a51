//! Background task driving one conversation link
//!
//! The task owns the transport exclusively; the manager talks to it through
//! a command channel. This keeps exactly one owner for the inbound frame
//! callback per link, which is what prevents cross-talk between an old and a
//! new conversation selection.

use std::pin::pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::error::{InboxError, Result};
use crate::transport::{Transport, TransportFactory};
use crate::types::frames::Frame;
use crate::types::identifiers::ConversationId;
use crate::types::options::{BackoffPolicy, Credential, ParticipantRole};

use super::state::ConnectionState;

/// Commands that can be sent to a link background task
pub(super) enum LinkCommand {
    /// Send a frame on the socket
    Send {
        /// Frame to send
        frame: Frame,
        /// Channel to send the operation result back
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// Tear the link down gracefully
    Close {
        /// Acknowledged once the state reached `Closed`
        response_tx: oneshot::Sender<()>,
    },
}

/// Everything a link task needs besides its command channel
pub(super) struct LinkContext<F: TransportFactory> {
    pub factory: Arc<F>,
    pub conversation: ConversationId,
    pub role: ParticipantRole,
    pub credential: Credential,
    pub backoff: BackoffPolicy,
    pub state_tx: watch::Sender<ConnectionState>,
    pub connectivity_tx: watch::Sender<bool>,
    pub inbound_tx: mpsc::UnboundedSender<(ConversationId, Frame)>,
}

enum HandshakeOutcome {
    Finished(Result<()>),
    CloseRequested(Option<oneshot::Sender<()>>),
}

enum OpenOutcome {
    TransportFailed(InboxError),
    CloseRequested(Option<oneshot::Sender<()>>),
}

/// Run one link until it is explicitly closed
///
/// Reconnects indefinitely with capped exponential backoff as long as the
/// link stays selected. After `offline_after_attempts` consecutive failures
/// the connectivity indicator latches Offline, but retrying continues.
pub(super) async fn run_link<F: TransportFactory>(
    ctx: LinkContext<F>,
    mut command_rx: mpsc::UnboundedReceiver<LinkCommand>,
) {
    let mut attempts: u32 = 0;

    loop {
        let _ = ctx.state_tx.send(ConnectionState::Connecting);

        let transport = ctx
            .factory
            .create(&ctx.conversation, ctx.role, &ctx.credential);
        let mut transport = match transport {
            Ok(transport) => transport,
            Err(e) => {
                log::warn!("[{}] failed to build transport: {e}", ctx.conversation);
                attempts += 1;
                if wait_before_retry(&ctx, &mut command_rx, attempts).await {
                    return;
                }
                continue;
            }
        };

        // Handshake, abortable by an explicit close.
        let outcome = {
            let mut connect = pin!(transport.connect());
            loop {
                tokio::select! {
                    result = &mut connect => break HandshakeOutcome::Finished(result),
                    cmd = command_rx.recv() => match cmd {
                        Some(LinkCommand::Send { response_tx, .. }) => {
                            let _ = response_tx.send(Err(InboxError::transport(
                                "connection not open",
                            )));
                        }
                        Some(LinkCommand::Close { response_tx }) => {
                            break HandshakeOutcome::CloseRequested(Some(response_tx));
                        }
                        None => break HandshakeOutcome::CloseRequested(None),
                    },
                }
            }
        };

        match outcome {
            HandshakeOutcome::CloseRequested(ack) => {
                close_link(&ctx, &mut transport, ack).await;
                return;
            }
            HandshakeOutcome::Finished(Err(e)) => {
                log::warn!("[{}] handshake failed: {e}", ctx.conversation);
            }
            HandshakeOutcome::Finished(Ok(())) => {
                attempts = 0;
                let _ = ctx.state_tx.send(ConnectionState::Open);
                ctx.connectivity_tx.send_replace(true);

                match pump_open_link(&ctx, &mut transport, &mut command_rx).await {
                    OpenOutcome::CloseRequested(ack) => {
                        close_link(&ctx, &mut transport, ack).await;
                        return;
                    }
                    OpenOutcome::TransportFailed(e) => {
                        log::warn!("[{}] connection lost: {e}", ctx.conversation);
                        let _ = transport.close().await;
                    }
                }
            }
        }

        attempts += 1;
        if wait_before_retry(&ctx, &mut command_rx, attempts).await {
            return;
        }
    }
}

/// Pump frames and commands while the link is `Open`
async fn pump_open_link<F: TransportFactory>(
    ctx: &LinkContext<F>,
    transport: &mut F::Transport,
    command_rx: &mut mpsc::UnboundedReceiver<LinkCommand>,
) -> OpenOutcome {
    let mut frames = transport.read_frames();

    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(LinkCommand::Send { frame, response_tx }) => {
                    let result = transport.send(&frame).await;
                    let _ = response_tx.send(result);
                }
                Some(LinkCommand::Close { response_tx }) => {
                    return OpenOutcome::CloseRequested(Some(response_tx));
                }
                None => return OpenOutcome::CloseRequested(None),
            },
            frame = frames.recv() => match frame {
                Some(Ok(frame)) => {
                    if ctx.inbound_tx.send((ctx.conversation.clone(), frame)).is_err() {
                        // Session is gone; nothing left to deliver to.
                        return OpenOutcome::CloseRequested(None);
                    }
                }
                Some(Err(e)) => return OpenOutcome::TransportFailed(e),
                None => return OpenOutcome::TransportFailed(InboxError::transport(
                    "socket stream ended",
                )),
            },
        }
    }
}

/// Transition `Closing -> Closed`, release the transport, acknowledge
async fn close_link<F: TransportFactory>(
    ctx: &LinkContext<F>,
    transport: &mut F::Transport,
    ack: Option<oneshot::Sender<()>>,
) {
    let _ = ctx.state_tx.send(ConnectionState::Closing);
    if let Err(e) = transport.close().await {
        log::warn!("[{}] close failed: {e}", ctx.conversation);
    }
    ctx.connectivity_tx.send_replace(false);
    let _ = ctx.state_tx.send(ConnectionState::Closed);
    if let Some(ack) = ack {
        let _ = ack.send(());
    }
}

/// Sleep out the backoff delay, still answering commands
///
/// Returns true when the link was closed during the wait and the task must
/// exit.
async fn wait_before_retry<F: TransportFactory>(
    ctx: &LinkContext<F>,
    command_rx: &mut mpsc::UnboundedReceiver<LinkCommand>,
    attempts: u32,
) -> bool {
    if attempts >= ctx.backoff.offline_after_attempts {
        ctx.connectivity_tx.send_replace(false);
    }
    let _ = ctx.state_tx.send(ConnectionState::Reconnecting);

    let delay = ctx.backoff.delay_for(attempts);
    log::debug!(
        "[{}] retrying in {:?} (attempt {attempts})",
        ctx.conversation,
        delay
    );

    let deadline = tokio::time::Instant::now() + delay;
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return false,
            cmd = command_rx.recv() => match cmd {
                Some(LinkCommand::Send { response_tx, .. }) => {
                    let _ = response_tx.send(Err(InboxError::transport("connection not open")));
                }
                Some(LinkCommand::Close { response_tx }) => {
                    ctx.connectivity_tx.send_replace(false);
                    let _ = ctx.state_tx.send(ConnectionState::Closed);
                    let _ = response_tx.send(());
                    return true;
                }
                None => {
                    ctx.connectivity_tx.send_replace(false);
                    let _ = ctx.state_tx.send(ConnectionState::Closed);
                    return true;
                }
            },
        }
    }
}
