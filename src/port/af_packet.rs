//! AF_PACKET port backend
//!
//! One non-blocking SOCK_RAW socket per configured interface, bound by
//! ifindex with promiscuous mode enabled. Frames are carried in pooled
//! buffers drawn from a shared free list; a transmit that would block leaves
//! the rest of the batch with the caller.

use super::{Frame, LinkState, PortId, PortStats, Ports, ETH_ADDR_HEADER_LEN};
use crate::telemetry::Counter;
use crate::{Error, Result};
use std::ffi::CString;
use std::os::unix::io::RawFd;
use tracing::trace;

/// AF_PACKET implementation of [`Ports`].
pub struct AfPacketPorts {
    ports: Vec<PortSocket>,
    pool: Vec<Vec<u8>>,
    frame_cap: usize,
}

struct PortSocket {
    fd: RawFd,
    ifindex: i32,
    name: String,
    rx_frames: Counter,
    tx_frames: Counter,
    rx_dropped: Counter,
}

impl AfPacketPorts {
    /// Opens one raw socket per interface and pre-fills the buffer pool with
    /// `pool_frames` buffers of `frame_cap` bytes.
    pub fn open(interfaces: &[String], pool_frames: usize, frame_cap: usize) -> Result<Self> {
        let mut ports = Vec::with_capacity(interfaces.len());
        for name in interfaces {
            ports.push(PortSocket::bind(name)?);
        }

        let pool = (0..pool_frames).map(|_| vec![0u8; frame_cap]).collect();

        Ok(Self {
            ports,
            pool,
            frame_cap,
        })
    }
}

impl Ports for AfPacketPorts {
    fn port_count(&self) -> usize {
        self.ports.len()
    }

    fn receive(&mut self, port: PortId, max: usize) -> Vec<Frame> {
        let sock = &self.ports[port];
        let mut batch = Vec::with_capacity(max);

        while batch.len() < max {
            let mut buf = match self.pool.pop() {
                Some(buf) => buf,
                // Pool exhausted: leave the rest on the socket. Pending
                // frames stay on the kernel ring and show up in its drop
                // counter if it overflows.
                None => break,
            };

            let n = unsafe {
                libc::recv(
                    sock.fd,
                    buf.as_mut_ptr() as *mut libc::c_void,
                    buf.len(),
                    0,
                )
            };

            if n < 0 {
                self.pool.push(buf);
                let err = std::io::Error::last_os_error();
                if err.kind() != std::io::ErrorKind::WouldBlock {
                    trace!("recv on {} failed: {}", sock.name, err);
                }
                break;
            }

            let len = n as usize;
            if len < ETH_ADDR_HEADER_LEN {
                // Runt frame: AF_PACKET delivers raw frames without the
                // hardware padding a NIC would apply, so anything shorter
                // than the address header is discarded here - the dataplane
                // assumes the header is present.
                sock.rx_dropped.inc();
                self.pool.push(buf);
                continue;
            }

            sock.rx_frames.inc();
            batch.push(Frame::new(buf, len));
        }

        // Fold in kernel-side ring drops (the getsockopt read resets them).
        sock.rx_dropped.add(read_ring_drops(sock.fd));

        batch
    }

    fn transmit(&mut self, port: PortId, frames: Vec<Frame>) -> Vec<Frame> {
        let sock = &self.ports[port];
        let mut frames = frames.into_iter();
        let mut unsent = Vec::new();

        for frame in frames.by_ref() {
            let payload = frame.payload();
            let n = unsafe {
                libc::send(
                    sock.fd,
                    payload.as_ptr() as *const libc::c_void,
                    payload.len(),
                    0,
                )
            };

            if n < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() != std::io::ErrorKind::WouldBlock {
                    trace!("send on {} failed: {}", sock.name, err);
                }
                // Back-pressure: the rest of the batch stays with the caller.
                unsent.push(frame);
                break;
            }

            sock.tx_frames.inc();
            self.pool.push(frame.into_buf());
        }

        unsent.extend(frames);
        unsent
    }

    fn release(&mut self, frame: Frame) {
        let mut buf = frame.into_buf();
        // Releases of test-built frames may carry short buffers; restore the
        // pool's uniform capacity.
        if buf.len() < self.frame_cap {
            buf.resize(self.frame_cap, 0);
        }
        self.pool.push(buf);
    }

    fn link_state(&self, port: PortId) -> LinkState {
        self.ports[port].link_state()
    }

    fn stats(&self, port: PortId) -> PortStats {
        let sock = &self.ports[port];
        sock.rx_dropped.add(read_ring_drops(sock.fd));
        PortStats {
            rx_frames: sock.rx_frames.get(),
            tx_frames: sock.tx_frames.get(),
            rx_dropped: sock.rx_dropped.get(),
        }
    }
}

impl PortSocket {
    fn bind(ifname: &str) -> Result<Self> {
        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                (libc::ETH_P_ALL as u16).to_be() as i32,
            )
        };

        if fd < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let ifindex = match get_ifindex(fd, ifname) {
            Ok(idx) => idx,
            Err(e) => {
                unsafe { libc::close(fd) };
                return Err(e);
            }
        };

        let sockaddr = libc::sockaddr_ll {
            sll_family: libc::AF_PACKET as u16,
            sll_protocol: (libc::ETH_P_ALL as u16).to_be(),
            sll_ifindex: ifindex,
            sll_hatype: 0,
            sll_pkttype: 0,
            sll_halen: 0,
            sll_addr: [0; 8],
        };

        let ret = unsafe {
            libc::bind(
                fd,
                &sockaddr as *const _ as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_ll>() as u32,
            )
        };

        if ret < 0 {
            unsafe { libc::close(fd) };
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        // Non-blocking: the forwarding loop polls, it never waits.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };

        if let Err(e) = set_promisc(fd, ifindex) {
            unsafe { libc::close(fd) };
            return Err(e);
        }

        Ok(Self {
            fd,
            ifindex,
            name: ifname.to_string(),
            rx_frames: Counter::new(),
            tx_frames: Counter::new(),
            rx_dropped: Counter::new(),
        })
    }

    fn link_state(&self) -> LinkState {
        let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
        let name_bytes = self.name.as_bytes();
        if name_bytes.len() >= ifr.ifr_name.len() {
            return LinkState::Down;
        }
        for (dst, src) in ifr.ifr_name.iter_mut().zip(name_bytes) {
            *dst = *src as libc::c_char;
        }

        let ret = unsafe { libc::ioctl(self.fd, libc::SIOCGIFFLAGS, &mut ifr) };
        if ret < 0 {
            return LinkState::Down;
        }

        let flags = unsafe { ifr.ifr_ifru.ifru_flags } as libc::c_int;
        if flags & libc::IFF_UP != 0 && flags & libc::IFF_RUNNING != 0 {
            LinkState::Up
        } else {
            LinkState::Down
        }
    }
}

impl Drop for AfPacketPorts {
    fn drop(&mut self) {
        for sock in &self.ports {
            let _ = drop_promisc(sock.fd, sock.ifindex);
            unsafe { libc::close(sock.fd) };
        }
    }
}

fn get_ifindex(fd: RawFd, ifname: &str) -> Result<i32> {
    let ifname_c = CString::new(ifname).map_err(|_| Error::InterfaceNotFound {
        name: ifname.to_string(),
    })?;

    let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
    let name_bytes = ifname_c.as_bytes_with_nul();
    if name_bytes.len() > ifr.ifr_name.len() {
        return Err(Error::InterfaceNotFound {
            name: ifname.to_string(),
        });
    }
    ifr.ifr_name[..name_bytes.len()].copy_from_slice(unsafe {
        std::slice::from_raw_parts(name_bytes.as_ptr() as *const libc::c_char, name_bytes.len())
    });

    let ret = unsafe { libc::ioctl(fd, libc::SIOCGIFINDEX, &mut ifr) };
    if ret < 0 {
        return Err(Error::InterfaceNotFound {
            name: ifname.to_string(),
        });
    }

    Ok(unsafe { ifr.ifr_ifru.ifru_ifindex })
}

fn membership(fd: RawFd, ifindex: i32, optname: libc::c_int) -> Result<()> {
    let mreq = libc::packet_mreq {
        mr_ifindex: ifindex,
        mr_type: libc::PACKET_MR_PROMISC as u16,
        mr_alen: 0,
        mr_address: [0; 8],
    };

    let ret = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_PACKET,
            optname,
            &mreq as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::packet_mreq>() as u32,
        )
    };

    if ret < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    Ok(())
}

fn set_promisc(fd: RawFd, ifindex: i32) -> Result<()> {
    membership(fd, ifindex, libc::PACKET_ADD_MEMBERSHIP)
}

fn drop_promisc(fd: RawFd, ifindex: i32) -> Result<()> {
    membership(fd, ifindex, libc::PACKET_DROP_MEMBERSHIP)
}

// From linux/if_packet.h
const PACKET_STATISTICS: libc::c_int = 6;

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct TpacketStats {
    tp_packets: u32,
    tp_drops: u32,
}

/// Reads and resets the kernel's drop counter for this socket.
fn read_ring_drops(fd: RawFd) -> u64 {
    let mut stats = TpacketStats::default();
    let mut len = std::mem::size_of::<TpacketStats>() as libc::socklen_t;

    let ret = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_PACKET,
            PACKET_STATISTICS,
            &mut stats as *mut _ as *mut libc::c_void,
            &mut len,
        )
    };

    if ret < 0 {
        0
    } else {
        stats.tp_drops as u64
    }
}
