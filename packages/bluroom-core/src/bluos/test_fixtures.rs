//! Shared test fixtures for BluOS `/SyncStatus` and `/Status` payloads.
//!
//! These constants are used by multiple test modules to avoid duplication.

/// Standalone player, not grouped.
pub const SYNC_STATUS_STANDALONE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SyncStatus icon="/images/players/N130_nt.png" volume="24" modelName="NODE" name="Office" model="N130" brand="Bluesound" etag="7" schemaVersion="34" syncStat="7" id="192.168.1.30:11000" mac="90:56:82:AA:BB:01">
</SyncStatus>"#;

/// Group master reporting one slave at 192.168.1.11.
pub const SYNC_STATUS_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SyncStatus icon="/images/players/P230_nt.png" volume="35" modelName="PULSE 2i" name="Living Room" model="P230" brand="Bluesound" group="Living Room+Kitchen" id="192.168.1.10:11000" mac="90:56:82:AA:BB:10">
  <slave port="11000" id="192.168.1.11"/>
</SyncStatus>"#;

/// Group slave pointing at its master at 192.168.1.10.
pub const SYNC_STATUS_SLAVE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SyncStatus icon="/images/players/P125_nt.png" volume="18" modelName="PULSE FLEX 2i" name="Kitchen" model="P125" brand="Bluesound" id="192.168.1.11:11000" mac="90:56:82:AA:BB:11">
  <master port="11000">192.168.1.10</master>
</SyncStatus>"#;

/// Player feeding an external amplifier (fixed output level).
pub const SYNC_STATUS_FIXED_VOLUME: &str = r#"<SyncStatus volume="-1" modelName="NODE" name="Hi-Fi" brand="Bluesound" mac="90:56:82:AA:BB:20"/>"#;

/// Primary half of a stereo pair.
pub const SYNC_STATUS_STEREO_PRIMARY: &str = r#"<SyncStatus volume="30" modelName="PULSE M" name="Den Left" brand="Bluesound" zone="Den" zoneMaster="true" channelMode="left" mac="90:56:82:AA:BB:30"/>"#;

/// Primary half of a stereo pair that also lists its partner as a slave.
pub const SYNC_STATUS_STEREO_PRIMARY_WITH_SLAVE: &str = r#"<SyncStatus volume="30" modelName="PULSE M" name="Den Left" brand="Bluesound" zone="Den" zoneMaster="true" channelMode="left" mac="90:56:82:AA:BB:30">
  <slave port="11000" id="192.168.1.41"/>
</SyncStatus>"#;

/// Secondary (silent) half of a stereo pair.
pub const SYNC_STATUS_STEREO_SECONDARY: &str = r#"<SyncStatus volume="30" modelName="PULSE M" name="Den Right" brand="Bluesound" zone="Den" zoneSlave="true" channelMode="right" mac="90:56:82:AA:BB:31">
  <master port="11000">192.168.1.40</master>
</SyncStatus>"#;

/// Malformed payload reporting both roles at once.
pub const SYNC_STATUS_BOTH_ROLES: &str = r#"<SyncStatus volume="10" name="Confused" brand="Bluesound">
  <master port="11000">192.168.1.10</master>
  <slave port="11000" id="192.168.1.12"/>
</SyncStatus>"#;

/// Now-playing payload while streaming from Qobuz.
pub const STATUS_PLAYING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<status etag="4e266c9fbfba6d13d1a4d6ff4bd2e1e6">
  <album>Kind of Blue</album>
  <artist>Miles Davis</artist>
  <image>/Artwork?service=Qobuz&amp;songid=Qobuz%3A123</image>
  <name>So What</name>
  <title1>So What</title1>
  <title2>Miles Davis</title2>
  <title3>Kind of Blue</title3>
  <secs>63</secs>
  <totlen>562</totlen>
  <service>Qobuz</service>
  <state>play</state>
  <volume>35</volume>
</status>"#;

/// Radio stream with only the secondary title lines populated.
pub const STATUS_RADIO: &str = r#"<status>
  <title1>Radio Paradise</title1>
  <title2>Eclectic mix</title2>
  <image>https://img.radioparadise.com/covers/l/123.jpg</image>
  <secs>12</secs>
  <service>RadioParadise</service>
  <state>stream</state>
</status>"#;
