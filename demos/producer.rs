//! Publishes one name ("temp") answered with a fixed reading, then runs
//! the daemon loop in broadcast mode so peers can ask for it.
//!
//! Usage: `producer <bind-addr> <broadcast-addr> [port]`

use std::net::{Ipv4Addr as StdIpv4Addr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use ndn_std::daemon::Server;
use ndn_std::udp::BroadcastTransport;
use no_std_net::Ipv4Addr;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let mut args = std::env::args().skip(1);
    let bind_addr: StdIpv4Addr = args
        .next()
        .unwrap_or_else(|| "0.0.0.0".into())
        .parse()?;
    let broadcast_addr: StdIpv4Addr = args
        .next()
        .unwrap_or_else(|| "255.255.255.255".into())
        .parse()?;
    let port: u16 = args
        .next()
        .map(|p| p.parse())
        .transpose()?
        .unwrap_or(ndn::NDN_PORT);

    let socket = UdpSocket::bind(SocketAddrV4::new(bind_addr, port))?;
    socket.set_broadcast(true)?;

    let [a, b, c, d] = bind_addr.octets();
    let local_addr = Ipv4Addr::new(a, b, c, d);
    let [a, b, c, d] = broadcast_addr.octets();
    let broadcast_addr = Ipv4Addr::new(a, b, c, d);

    let transport = BroadcastTransport::new(socket, broadcast_addr, port);
    let mut server: Server<_, 10> = Server::new(transport, local_addr, ndn::PIT_TTL_MS);

    server.publish([(
        b"temp".to_vec(),
        Box::new(|| Some(b"21C".to_vec())) as ndn::registry::ProducerFn,
    )])?;

    log::info!("producer ready on {bind_addr}:{port}, publishing \"temp\"");

    server.run(Duration::from_secs(1))?;

    Ok(())
}
