//! UART link to the network time co-processor
//!
//! Sends a request line whenever the controller asks for a sync and
//! forwards every decoded response. Timeouts are the controller's job;
//! this task never gives up on an exchange by itself.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use pixclock_protocol::{LineDecoder, SyncFailure, TimeSyncResult, SYNC_REQUEST};

use crate::channels::{SYNC_RESULT, SYNC_START};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn time_link_task(mut tx: BufferedUartTx, mut rx: BufferedUartRx) {
    info!("Time link task started");

    let mut decoder = LineDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match select(SYNC_START.wait(), rx.read(&mut buf)).await {
            Either::First(()) => {
                if let Err(e) = tx.write_all(SYNC_REQUEST).await {
                    warn!("Time link write failed: {:?}", e);
                    SYNC_RESULT.signal(TimeSyncResult::Failure(SyncFailure::NoLink));
                }
            }
            Either::Second(Ok(n)) => {
                for &byte in &buf[..n] {
                    if let Some(result) = decoder.push(byte) {
                        debug!("Time link result {:?}", result);
                        SYNC_RESULT.signal(result);
                    }
                }
            }
            Either::Second(Err(e)) => {
                warn!("Time link read error: {:?}", e);
            }
        }
    }
}
