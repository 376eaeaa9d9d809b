//! Recording mock collaborators shared by the engine tests

use crate::endpoint::Icmpv6Endpoint;
use crate::stats::Icmpv6Stats;
use netsix_core::{
    ControlKind, Error, LinkAddr, LinkEndpoint, NicId, NudController, PacketParams,
    ReachabilityConfirmation, RecvBuffer, Result, Route, StackContext, TentativeStatus,
    TransportDispatcher,
};
use netsix_packet::checksum::icmpv6_checksum;
use netsix_packet::icmpv6::set_checksum;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const NIC: NicId = NicId(1);
pub const LOCAL_MAC: LinkAddr = LinkAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub const REMOTE_MAC: LinkAddr = LinkAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);

pub fn local_addr() -> Ipv6Addr {
    "fe80::1".parse().unwrap()
}

pub fn remote_addr() -> Ipv6Addr {
    "fe80::2".parse().unwrap()
}

/// Embed the checksum into `message` as if it travelled `route` inbound
/// with `payload` behind it
pub fn checksummed(mut message: Vec<u8>, route: &Route, payload: &RecvBuffer) -> Vec<u8> {
    let checksum = icmpv6_checksum(&message, &route.remote_addr, &route.local_addr, payload);
    set_checksum(&mut message, checksum);
    message
}

/// Serialized Neighbor Solicitation with `options` appended raw
pub fn ns_message(target: Ipv6Addr, options: &[u8]) -> Vec<u8> {
    let mut message = vec![135, 0, 0, 0, 0, 0, 0, 0];
    message.extend_from_slice(&target.octets());
    message.extend_from_slice(options);
    message
}

/// Serialized Neighbor Advertisement; `flags` is the raw first body byte
pub fn na_message(target: Ipv6Addr, flags: u8, options: &[u8]) -> Vec<u8> {
    let mut message = vec![136, 0, 0, 0, flags, 0, 0, 0];
    message.extend_from_slice(&target.octets());
    message.extend_from_slice(options);
    message
}

/// Serialized Router Solicitation with `options` appended raw
pub fn rs_message(options: &[u8]) -> Vec<u8> {
    let mut message = vec![133, 0, 0, 0, 0, 0, 0, 0];
    message.extend_from_slice(options);
    message
}

/// Serialized Router Advertisement: hop limit 64, no flags, 30 minute
/// router lifetime
pub fn ra_message(options: &[u8]) -> Vec<u8> {
    let mut message = vec![134, 0, 0, 0, 64, 0, 0x07, 0x08, 0, 0, 0, 0, 0, 0, 0, 0];
    message.extend_from_slice(options);
    message
}

/// Source link-layer option carrying `REMOTE_MAC`
pub const SLL_OPTION: [u8; 8] = [1, 1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02];

/// Target link-layer option carrying `REMOTE_MAC`
pub const TLL_OPTION: [u8; 8] = [2, 1, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02];

#[derive(Default)]
pub struct MockStack {
    pub tentative_addrs: Mutex<Vec<Ipv6Addr>>,
    pub local_addrs: Mutex<Vec<Ipv6Addr>>,
    pub unknown_nic: AtomicBool,
    pub forwarding: AtomicBool,
    pub dup_reports: Mutex<Vec<(NicId, Ipv6Addr)>>,
    pub ra_events: Mutex<Vec<(NicId, Ipv6Addr, Vec<u8>)>>,
}

impl StackContext for MockStack {
    fn is_addr_tentative(&self, _nic: NicId, addr: Ipv6Addr) -> TentativeStatus {
        if self.unknown_nic.load(Ordering::Relaxed) {
            return TentativeStatus::UnknownNic;
        }
        if self.tentative_addrs.lock().unwrap().contains(&addr) {
            TentativeStatus::Tentative
        } else {
            TentativeStatus::NotTentative
        }
    }

    fn dup_tentative_addr_detected(&self, nic: NicId, addr: Ipv6Addr) {
        self.dup_reports.lock().unwrap().push((nic, addr));
    }

    fn check_local_address(&self, nic: NicId, addr: Ipv6Addr) -> Option<NicId> {
        if self.local_addrs.lock().unwrap().contains(&addr) {
            Some(nic)
        } else {
            None
        }
    }

    fn handle_ndp_ra(&self, nic: NicId, router_addr: Ipv6Addr, ra_body: &[u8]) {
        self.ra_events
            .lock()
            .unwrap()
            .push((nic, router_addr, ra_body.to_vec()));
    }

    fn forwarding(&self) -> bool {
        self.forwarding.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
pub struct MockNud {
    pub probes: Mutex<Vec<(Ipv6Addr, Ipv6Addr, u16, LinkAddr)>>,
    pub confirmations: Mutex<Vec<(Ipv6Addr, LinkAddr, ReachabilityConfirmation)>>,
}

impl NudController for MockNud {
    fn handle_probe(&self, remote: Ipv6Addr, local: Ipv6Addr, protocol: u16, link_addr: LinkAddr) {
        self.probes
            .lock()
            .unwrap()
            .push((remote, local, protocol, link_addr));
    }

    fn handle_confirmation(
        &self,
        target: Ipv6Addr,
        link_addr: LinkAddr,
        flags: ReachabilityConfirmation,
    ) {
        self.confirmations
            .lock()
            .unwrap()
            .push((target, link_addr, flags));
    }
}

#[derive(Default)]
pub struct MockTransport {
    pub packets: Mutex<Vec<(Route, u8, Vec<u8>)>>,
    pub controls: Mutex<Vec<(Ipv6Addr, Ipv6Addr, u8, ControlKind, u32, Vec<u8>)>>,
}

impl TransportDispatcher for MockTransport {
    fn deliver_transport_packet(&self, route: &Route, protocol: u8, data: RecvBuffer) {
        self.packets
            .lock()
            .unwrap()
            .push((route.clone(), protocol, data.to_vec()));
    }

    fn deliver_control_packet(
        &self,
        local: Ipv6Addr,
        remote: Ipv6Addr,
        protocol: u8,
        kind: ControlKind,
        extra: u32,
        data: RecvBuffer,
    ) {
        self.controls
            .lock()
            .unwrap()
            .push((local, remote, protocol, kind, extra, data.to_vec()));
    }
}

pub struct SentPacket {
    pub route: Route,
    pub params: PacketParams,
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
}

pub struct MockLink {
    pub link_addr: LinkAddr,
    pub fail: AtomicBool,
    pub sent: Mutex<Vec<SentPacket>>,
}

impl Default for MockLink {
    fn default() -> Self {
        MockLink {
            link_addr: LOCAL_MAC,
            fail: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl LinkEndpoint for MockLink {
    fn link_address(&self) -> LinkAddr {
        self.link_addr
    }

    fn max_header_length(&self) -> usize {
        54
    }

    fn write_packet(
        &self,
        route: &Route,
        params: PacketParams,
        header: &[u8],
        payload: &RecvBuffer,
    ) -> Result<()> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(Error::transmit("mock link down"));
        }
        self.sent.lock().unwrap().push(SentPacket {
            route: route.clone(),
            params,
            header: header.to_vec(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

/// An endpoint on `NIC` bound to `local_addr()`, wired to recording
/// mocks
pub struct TestEndpoint {
    pub stack: Arc<MockStack>,
    pub nud: Arc<MockNud>,
    pub transport: Arc<MockTransport>,
    pub link: Arc<MockLink>,
    pub stats: Arc<Icmpv6Stats>,
    pub endpoint: Icmpv6Endpoint,
}

impl TestEndpoint {
    pub fn new() -> Self {
        let stack = Arc::new(MockStack::default());
        let nud = Arc::new(MockNud::default());
        let transport = Arc::new(MockTransport::default());
        let link = Arc::new(MockLink::default());
        let stats = Arc::new(Icmpv6Stats::new());
        let endpoint = Icmpv6Endpoint::new(
            NIC,
            local_addr(),
            stack.clone(),
            nud.clone(),
            transport.clone(),
            link.clone(),
            stats.clone(),
        );
        TestEndpoint {
            stack,
            nud,
            transport,
            link,
            stats,
            endpoint,
        }
    }

    /// Route the demux would build for a packet from `remote` to `local`
    pub fn route_from(&self, remote: Ipv6Addr, local: Ipv6Addr) -> Route {
        Route::new(local, LOCAL_MAC, remote).with_remote_link_addr(REMOTE_MAC)
    }

    pub fn route(&self) -> Route {
        self.route_from(remote_addr(), local_addr())
    }

    /// Checksum `message` and deliver it at hop limit 255 with no
    /// fragment header
    pub fn deliver(&self, route: &Route, message: Vec<u8>) {
        self.deliver_at(route, 255, message);
    }

    /// Checksum `message` and deliver it at the given hop limit
    pub fn deliver_at(&self, route: &Route, hop_limit: u8, message: Vec<u8>) {
        let message = checksummed(message, route, &RecvBuffer::default());
        self.endpoint
            .handle_packet(route, hop_limit, RecvBuffer::from(message), false);
    }

    /// Deliver raw segments without touching the checksum
    pub fn deliver_raw(
        &self,
        route: &Route,
        hop_limit: u8,
        data: RecvBuffer,
        has_fragment_header: bool,
    ) {
        self.endpoint
            .handle_packet(route, hop_limit, data, has_fragment_header);
    }
}
