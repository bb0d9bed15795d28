//! Device status decoding.
//!
//! Turns the raw XML returned by a player's `/SyncStatus` and `/Status`
//! endpoints into [`Player`] and [`PlaybackStatus`] values.
//!
//! Absent optional fields are not errors. Only a payload without the
//! expected root element is rejected.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

use crate::bluos::types::{PlaybackState, PlaybackStatus, Player};
use crate::bluos::utils::{
    decode_entities, get_bool_attr, get_non_empty_attr, resolve_image_url,
};
use crate::protocol_constants::{FIXED_VOLUME_THRESHOLD, MAX_VOLUME};

const SYNC_STATUS_ROOT: &str = "SyncStatus";
const STATUS_ROOT: &str = "status";

/// Errors that can occur while decoding a device payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload contains no element at all.
    #[error("payload has no <{expected}> root element")]
    MissingRoot { expected: &'static str },

    /// The payload's root element is not the one this decoder handles.
    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    /// The XML could not be read before the root element.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Convenient Result alias for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Checks that `e` is the expected root element.
fn expect_root(e: &BytesStart, expected: &'static str) -> DecodeResult<()> {
    let local_name = e.local_name();
    let found = String::from_utf8_lossy(local_name.as_ref());
    if found == expected {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedRoot {
            expected,
            found: found.to_string(),
        })
    }
}

/// Normalizes a reported volume into `(volume, is_fixed_volume)`.
///
/// Negative values mean the level is fixed and read as 0.
fn normalize_volume(raw: Option<&str>) -> (u8, bool) {
    let Some(level) = raw.and_then(|v| v.trim().parse::<i32>().ok()) else {
        return (0, false);
    };

    if level < FIXED_VOLUME_THRESHOLD {
        (0, true)
    } else {
        (level.min(i32::from(MAX_VOLUME)) as u8, false)
    }
}

/// Root attributes of a `<SyncStatus>` element.
#[derive(Default)]
struct SyncAttributes {
    name: Option<String>,
    model_name: Option<String>,
    brand: Option<String>,
    mac: Option<String>,
    volume: Option<String>,
    group: Option<String>,
    zone: Option<String>,
    zone_master: bool,
    zone_slave: bool,
    channel_mode: Option<String>,
}

impl SyncAttributes {
    fn read(e: &BytesStart) -> Self {
        Self {
            name: get_non_empty_attr(e, b"name"),
            model_name: get_non_empty_attr(e, b"modelName")
                .or_else(|| get_non_empty_attr(e, b"model")),
            brand: get_non_empty_attr(e, b"brand"),
            mac: get_non_empty_attr(e, b"mac").map(|m| m.to_uppercase()),
            volume: get_non_empty_attr(e, b"volume"),
            group: get_non_empty_attr(e, b"group"),
            zone: get_non_empty_attr(e, b"zone"),
            zone_master: get_bool_attr(e, b"zoneMaster"),
            zone_slave: get_bool_attr(e, b"zoneSlave"),
            channel_mode: get_non_empty_attr(e, b"channelMode"),
        }
    }
}

/// Decodes a `/SyncStatus` payload into a [`Player`].
///
/// # Arguments
/// * `xml` - Raw payload returned by the device
/// * `address` - Address the payload was fetched from
/// * `port` - Port the payload was fetched from
///
/// # Role Reporting
/// A master lists `<slave id=".." port=".."/>` children; a slave carries a
/// `<master port="..">address</master>` child. A payload reporting both is
/// treated as a slave and its slave list is discarded, so the decoded player
/// is never a master with a master address.
pub fn decode_sync_status(xml: &str, address: &str, port: u16) -> DecodeResult<Player> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut attrs: Option<SyncAttributes> = None;
    let mut master_address: Option<String> = None;
    let mut slave_addresses: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if attrs.is_none() => {
                expect_root(e, SYNC_STATUS_ROOT)?;
                attrs = Some(SyncAttributes::read(e));
            }
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"master" => {
                if let Ok(text) = reader.read_text(e.name()) {
                    let master = decode_entities(text.trim());
                    if !master.is_empty() {
                        master_address = Some(master);
                    }
                }
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"slave" =>
            {
                if let Some(slave) = get_non_empty_attr(e, b"id") {
                    if !slave_addresses.contains(&slave) {
                        slave_addresses.push(slave);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                if attrs.is_none() {
                    return Err(DecodeError::Malformed(e.to_string()));
                }
                log::warn!("[Decoder] XML error in SyncStatus from {}: {}", address, e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    let attrs = attrs.ok_or(DecodeError::MissingRoot {
        expected: SYNC_STATUS_ROOT,
    })?;

    if master_address.is_some() && !slave_addresses.is_empty() {
        log::debug!(
            "[Decoder] {} reports both a master and {} slave(s); treating as slave",
            address,
            slave_addresses.len()
        );
        slave_addresses.clear();
    }

    let is_master =
        master_address.is_none() && (!slave_addresses.is_empty() || attrs.group.is_some());
    let is_grouped = is_master || master_address.is_some();
    let (volume, is_fixed_volume) = normalize_volume(attrs.volume.as_deref());

    let id = attrs
        .mac
        .clone()
        .unwrap_or_else(|| Player::composite_id(address, port));

    Ok(Player {
        id,
        address: address.to_string(),
        port,
        name: attrs
            .name
            .unwrap_or_else(|| format!("BluOS ({})", address)),
        model_name: attrs.model_name,
        brand: attrs.brand,
        hardware_address: attrs.mac,
        volume,
        is_fixed_volume,
        is_grouped,
        is_master,
        master_address,
        slave_addresses,
        group_name: attrs.group,
        is_stereo_paired: attrs.zone_master || attrs.zone_slave,
        channel_mode: attrs.channel_mode,
        zone_name: attrs.zone,
        is_secondary_stereo_pair_speaker: attrs.zone_slave,
    })
}

/// Decodes a `/Status` payload into a [`PlaybackStatus`].
///
/// Title, artist and album fall back to the `title1`..`title3` display lines
/// that radio services populate instead of track tags. Relative artwork
/// paths are resolved against the reporting player.
pub fn decode_playback_status(xml: &str, address: &str, port: u16) -> DecodeResult<PlaybackStatus> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut root_seen = false;
    let mut state = None;
    let mut name = None;
    let mut title1 = None;
    let mut artist = None;
    let mut title2 = None;
    let mut album = None;
    let mut title3 = None;
    let mut image = None;
    let mut secs = None;
    let mut totlen = None;
    let mut service = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if !root_seen => {
                expect_root(e, STATUS_ROOT)?;
                root_seen = true;
            }
            Ok(Event::Start(ref e)) => {
                let slot = match e.local_name().as_ref() {
                    b"state" => Some(&mut state),
                    b"name" => Some(&mut name),
                    b"title1" => Some(&mut title1),
                    b"artist" => Some(&mut artist),
                    b"title2" => Some(&mut title2),
                    b"album" => Some(&mut album),
                    b"title3" => Some(&mut title3),
                    b"image" => Some(&mut image),
                    b"secs" => Some(&mut secs),
                    b"totlen" => Some(&mut totlen),
                    b"service" => Some(&mut service),
                    _ => None,
                };
                if let Some(slot) = slot {
                    if let Ok(text) = reader.read_text(e.name()) {
                        let value = decode_entities(text.trim());
                        if !value.is_empty() {
                            *slot = Some(value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                if !root_seen {
                    return Err(DecodeError::Malformed(e.to_string()));
                }
                log::warn!("[Decoder] XML error in Status from {}: {}", address, e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if !root_seen {
        return Err(DecodeError::MissingRoot {
            expected: STATUS_ROOT,
        });
    }

    let total_seconds = totlen.and_then(|t| t.parse::<u32>().ok());
    let current_seconds = secs
        .and_then(|s| s.parse::<u32>().ok())
        .map(|current| match total_seconds {
            Some(total) => current.min(total),
            None => current,
        });

    Ok(PlaybackStatus {
        state: state
            .as_deref()
            .map(PlaybackState::from_bluos)
            .unwrap_or_default(),
        title: name.or(title1),
        artist: artist.or(title2),
        album: album.or(title3),
        image_url: image.map(|i| resolve_image_url(address, port, &i)),
        current_seconds,
        total_seconds,
        service_name: service,
    })
}
