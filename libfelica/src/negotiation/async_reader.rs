// libfelica/src/negotiation/async_reader.rs

use crate::config::ReaderConfig;
use crate::negotiation::reader::{ReadOutcome, Session};
use crate::node::Service;
use crate::transport::{exchange_async, AsyncTransport};
use crate::types::Idm;
use crate::Result;

/// Async driver for the same rounds [`crate::negotiation::BlockReader`]
/// runs. `block_counts` seeds services whose size is already known.
pub async fn read_blocks_from_services_async<T: AsyncTransport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    services: &[Service],
    config: &ReaderConfig,
    block_counts: &[(Service, u16)],
) -> Result<ReadOutcome> {
    let mut session = Session::new(idm, services, config, block_counts);
    while let Some((batch, command)) = session.next_request()? {
        match exchange_async(transport, &command, Some(config.timeout)).await {
            Ok(response) => {
                if session.on_response(&batch, response)?.is_some() {
                    break;
                }
            }
            Err(e) if e.is_transport() => {
                session.on_transport_error(&e);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(session.outcome())
}
