//! Interest masks and the raw event record exchanged with the channel.

bitflags::bitflags! {
    /// Conditions a descriptor can be watched for.
    ///
    /// The notification facility reports *transitions* into these states,
    /// once per transition, not the ongoing fact of readiness.
    #[rustfmt::skip]
    pub struct Interest: u32 {
        /// = EPOLLIN
        const IN  = 0x0001;
        /// = EPOLLOUT
        const OUT = 0x0004;
        /// = EPOLLERR
        const ERR = 0x0008;
        /// = EPOLLHUP
        const HUP = 0x0010;

        /// Everything a tracked descriptor is watched for by default.
        const ALL = Self::IN.bits | Self::OUT.bits | Self::ERR.bits | Self::HUP.bits;
        /// What descriptor kinds with a restricted condition subset (e.g.
        /// listening sockets) can still be watched for.
        const REDUCED = Self::IN.bits | Self::HUP.bits;
    }
}

/// One entry of the result buffer filled by a channel wait.
///
/// The multiplexed-wait algorithm never inspects the contents; the record
/// exists so the buffer has the shape the facility expects.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawEvent {
    pub events: u32,
    pub data: u64,
}
