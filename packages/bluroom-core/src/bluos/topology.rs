//! Topology resolver: flat player list to rooms.
//!
//! BluOS reports grouping from both ends. A master lists its slaves and each
//! slave points at its master, and the two reports can disagree during a
//! regroup. Both directions are checked; every player is claimed at most once,
//! first match wins, with masters processed in input order.
//!
//! Output order is `GroupType` (Single, StereoPair, MultiRoom), then name by
//! ordinal comparison, then id.

use crate::bluos::types::{GroupType, Player, PlayerGroup};

/// Groups players into rooms.
///
/// Secondary stereo-pair speakers never appear in the output. Every other
/// player appears in exactly one group, either as master or as a member.
pub fn organize_into_groups(players: &[Player]) -> Vec<PlayerGroup> {
    let visible: Vec<&Player> = players.iter().filter(|p| p.is_visible()).collect();
    let mut claimed = vec![false; visible.len()];
    let mut groups = Vec::with_capacity(visible.len());

    // Multi-room groups
    for i in 0..visible.len() {
        let master = visible[i];
        if claimed[i] || !(master.is_master && master.is_grouped) {
            continue;
        }
        claimed[i] = true;

        let mut members = Vec::new();

        for slave_address in &master.slave_addresses {
            let found = (0..visible.len())
                .find(|&j| !claimed[j] && visible[j].address == *slave_address);
            match found {
                Some(j) => {
                    claimed[j] = true;
                    members.push(visible[j].clone());
                }
                None => log::trace!(
                    "[Topology] {} lists slave {} which is absent or already claimed",
                    master.address,
                    slave_address
                ),
            }
        }

        for j in 0..visible.len() {
            if !claimed[j] && visible[j].master_address.as_deref() == Some(master.address.as_str())
            {
                claimed[j] = true;
                members.push(visible[j].clone());
            }
        }

        if members.is_empty() && lists_only_own_secondary(master, players) {
            groups.push(single_group(master));
        } else {
            groups.push(multi_room_group(master, members));
        }
    }

    // Standalone players and stereo pairs
    for i in 0..visible.len() {
        if !claimed[i] && !visible[i].is_grouped {
            claimed[i] = true;
            groups.push(single_group(visible[i]));
        }
    }

    // Inconsistent leftovers, e.g. a slave whose master did not answer
    for i in 0..visible.len() {
        if !claimed[i] {
            log::debug!(
                "[Topology] {} claims a group nobody else reports, showing it alone",
                visible[i].address
            );
            claimed[i] = true;
            groups.push(single_group(visible[i]));
        }
    }

    groups.sort_by(|a, b| {
        a.group_type
            .cmp(&b.group_type)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    log::debug!(
        "[Topology] {} player(s) resolved into {} group(s)",
        players.len(),
        groups.len()
    );
    groups
}

/// A stereo primary may list its own secondary as a slave. That is a pair,
/// not a multi-room group.
fn lists_only_own_secondary(master: &Player, players: &[Player]) -> bool {
    master.is_stereo_paired
        && !master.slave_addresses.is_empty()
        && master.slave_addresses.iter().all(|address| {
            players
                .iter()
                .any(|p| p.address == *address && p.is_secondary_stereo_pair_speaker)
        })
}

fn multi_room_group(master: &Player, members: Vec<Player>) -> PlayerGroup {
    let name = master
        .group_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            std::iter::once(master.display_name())
                .chain(members.iter().map(Player::display_name))
                .collect::<Vec<_>>()
                .join(" + ")
        });

    PlayerGroup {
        id: master.id.clone(),
        name,
        group_type: GroupType::MultiRoom,
        master: master.clone(),
        members,
    }
}

fn single_group(player: &Player) -> PlayerGroup {
    let group_type = if player.is_stereo_paired {
        GroupType::StereoPair
    } else {
        GroupType::Single
    };

    PlayerGroup {
        id: player.id.clone(),
        name: player.display_name().to_string(),
        group_type,
        master: player.clone(),
        members: Vec::new(),
    }
}
