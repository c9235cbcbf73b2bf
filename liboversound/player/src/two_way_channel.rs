use flume::{Receiver, RecvError, SendError, Sender};
use tokio::sync::oneshot::{Sender as OneShotSender, channel as oneshot_channel};

pub(crate) type Envelope<TIn, TOut> = (TIn, Option<OneShotSender<TOut>>);

/// Channel whose messages may optionally carry a reply slot.
pub(crate) fn two_way_channel<TIn, TOut>() -> (TwoWaySender<TIn, TOut>, TwoWayReceiver<TIn, TOut>) {
    let (main_tx, main_rx) = flume::unbounded();
    (
        TwoWaySender { main_tx },
        TwoWayReceiver {
            main_rx,
            oneshot: None,
        },
    )
}

#[derive(Debug)]
pub(crate) struct TwoWaySender<TIn, TOut> {
    main_tx: Sender<Envelope<TIn, TOut>>,
}

// Derived Clone would needlessly require TIn: Clone
impl<TIn, TOut> Clone for TwoWaySender<TIn, TOut> {
    fn clone(&self) -> Self {
        Self {
            main_tx: self.main_tx.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TwoWayReceiver<TIn, TOut> {
    main_rx: Receiver<Envelope<TIn, TOut>>,
    oneshot: Option<OneShotSender<TOut>>,
}

impl<TIn, TOut> TwoWaySender<TIn, TOut> {
    pub(crate) async fn send_async(&self, message: TIn) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.main_tx.send_async((message, None)).await
    }

    pub(crate) fn send(&self, message: TIn) -> Result<(), SendError<Envelope<TIn, TOut>>> {
        self.main_tx.send((message, None))
    }

    pub(crate) async fn get_response(&self, message: TIn) -> Result<TOut, String> {
        let (oneshot_tx, oneshot_rx) = oneshot_channel();
        self.main_tx
            .send_async((message, Some(oneshot_tx)))
            .await
            .map_err(|_| "Error sending request: receiver closed".to_owned())?;
        oneshot_rx
            .await
            .map_err(|e| format!("Error receiving response {e:?}"))
    }
}

impl<TIn, TOut> TwoWayReceiver<TIn, TOut> {
    pub(crate) async fn recv_async(&mut self) -> Result<TIn, RecvError> {
        let (message, oneshot) = self.main_rx.recv_async().await?;
        self.oneshot = oneshot;
        Ok(message)
    }

    /// Answers the message most recently received. A no-op if it asked for no reply.
    pub(crate) fn respond(&mut self, response: TOut) -> Result<(), TOut> {
        match self.oneshot.take() {
            Some(oneshot) => oneshot.send(response),
            None => Ok(()),
        }
    }
}
