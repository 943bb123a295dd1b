// Host-level collaborators: subprocesses and machine statistics.
// - `git_log.rs` reads the latest commits of the running checkout.
// - `host_info.rs` samples CPU, memory and OS details.
// - `speedtest.rs` shells out to `speedtest-cli`.

#[path = "git_log.rs"]
pub mod git_log;

#[path = "host_info.rs"]
pub mod host_info;

#[path = "speedtest.rs"]
pub mod speedtest;
