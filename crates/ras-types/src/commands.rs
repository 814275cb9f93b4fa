/// Pending-command bitmask carried in a client's cache entry and reported
/// once to the agent in the heartbeat reply.
pub const CMD_SEND_CONFIG: u64 = 0x01;
pub const CMD_GET_REPORT: u64 = 0x02;
