use anyhow::{Context, Result};
use log::info;

use crate::cli::SerialOpts;
use crate::frame::{REQUEST, ResponseFrame};
use crate::port::{Connector, Link, SerialConnector};

/// One request/response against the analyzer, for commissioning.
/// Touches neither the PWM outputs nor the failure counters.
pub fn run(opts: &SerialOpts) -> Result<()> {
    let mut connector = SerialConnector::new(opts.clone());
    info!("probe: {:?}", opts);
    let mut link = connector.connect()?;
    let co = exchange(&mut link)?;
    println!("co={co}");
    Ok(())
}

pub fn exchange<L: Link>(link: &mut L) -> Result<u16> {
    let mut frame = ResponseFrame::new();
    link.send(&REQUEST).context("send request")?;
    let n = link.recv(frame.buf_mut()).context("read response")?;
    frame.set_received(n);
    frame
        .co_value()
        .with_context(|| format!("response {:02X?}", frame.received()))
}
