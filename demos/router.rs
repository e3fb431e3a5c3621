//! A pure forwarder: publishes nothing locally, fans every Interest out
//! to a fixed set of peers and returns Data to whoever asked for it.
//!
//! Usage: `router <bind-addr> <port> <peer-addr>...`

use std::net::{Ipv4Addr as StdIpv4Addr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use ndn::transport::PeerSet;
use ndn_std::daemon::Server;
use ndn_std::udp::StaticPeersTransport;
use no_std_net::Ipv4Addr;

const MAX_PEERS: usize = 8;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let mut args = std::env::args().skip(1);

    let bind_addr: StdIpv4Addr = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing <bind-addr>"))?
        .parse()?;
    let port: u16 = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing <port>"))?
        .parse()?;

    let peer_addrs = args
        .map(|a| a.parse::<StdIpv4Addr>())
        .collect::<Result<Vec<_>, _>>()?;

    if peer_addrs.is_empty() {
        anyhow::bail!("at least one peer address is required");
    }

    let socket = UdpSocket::bind(SocketAddrV4::new(bind_addr, port))?;

    let [a, b, c, d] = bind_addr.octets();
    let local_addr = Ipv4Addr::new(a, b, c, d);

    let peer_ips: Vec<Ipv4Addr> = peer_addrs
        .iter()
        .map(|p| {
            let [a, b, c, d] = p.octets();
            Ipv4Addr::new(a, b, c, d)
        })
        .collect();

    let mut peers: PeerSet<MAX_PEERS> = PeerSet::new();
    peers.add_peers(&peer_ips)?;

    let transport = StaticPeersTransport::new(socket, peers, port);
    let mut server: Server<_, 10> = Server::new(transport, local_addr, ndn::PIT_TTL_MS);

    log::info!("router ready on {bind_addr}:{port}, forwarding to {peer_addrs:?}");

    server.run(Duration::from_secs(1))?;

    Ok(())
}
