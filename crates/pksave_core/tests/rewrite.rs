use pksave_core::checksum::{METADATA_RANGE, crc16_ccitt, crc16_reflected};
use pksave_core::core_api::CoreErrorCode;
use pksave_core::format::family_format;
use pksave_core::layout::{GEN4_COPY_SHIFT, SM_TABLE, checksum_offsets, gen4_layout};
use pksave_core::{
    ActiveSlots, Family, GameVersion, NoResign, SlotIndex, locate_active_slots, rewrite_checksums,
    verify_checksums,
};
use quickcheck::{QuickCheck, TestResult};

fn noise_image(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

fn read_u16(image: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([image[offset], image[offset + 1]])
}

fn changed_offsets(before: &[u8], after: &[u8]) -> Vec<usize> {
    before
        .iter()
        .zip(after)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i)
        .collect()
}

fn rewritten(family: Family, seed: u64) -> (GameVersion, ActiveSlots, Vec<u8>) {
    let version = family.titles()[0];
    let mut image = noise_image(family.image_len(), seed);
    let slots = locate_active_slots(&image, version).expect("slots");
    rewrite_checksums(&mut image, version, slots, &mut NoResign).expect("rewrite");
    (version, slots, image)
}

#[test]
fn rewrite_reaches_a_fixed_point_for_every_family() {
    for family in Family::ALL {
        let (version, slots, image) = rewritten(family, family as u64 + 1);

        let report = verify_checksums(&image, version, slots).expect("verify");
        assert!(report.is_valid(), "{family}: {:?}", report.invalid_blocks());
        assert_eq!(report.blocks.len(), family_format(family).block_count());

        let mut again = image.clone();
        rewrite_checksums(&mut again, version, slots, &mut NoResign).expect("rewrite");
        assert!(again == image, "{family}: second rewrite changed bytes");
    }
}

#[test]
fn rewrite_reports_block_counts() {
    let expected = [
        (Family::DiamondPearl, 2),
        (Family::Platinum, 2),
        (Family::HeartGoldSoulSilver, 2),
        (Family::BlackWhite, 26),
        (Family::Black2White2, 26),
        (Family::XY, 55),
        (Family::OmegaRubyAlphaSapphire, 58),
        (Family::SunMoon, 37),
    ];
    for (family, blocks) in expected {
        let version = family.titles()[0];
        let mut image = noise_image(family.image_len(), 3);
        let summary = rewrite_checksums(&mut image, version, ActiveSlots::default(), &mut NoResign)
            .expect("rewrite");
        assert_eq!(summary.family, Some(family));
        assert_eq!(summary.blocks, blocks, "{family}");
    }
}

#[test]
fn unrecognized_version_writes_nothing() {
    let mut image = noise_image(0x80000, 9);
    let before = image.clone();
    let summary = rewrite_checksums(
        &mut image,
        GameVersion::Unknown(0xEE),
        ActiveSlots::default(),
        &mut NoResign,
    )
    .expect("no-op");

    assert_eq!(summary.blocks, 0);
    assert_eq!(summary.family, None);
    assert!(image == before);
}

#[test]
fn short_image_is_rejected_without_writes() {
    let mut image = noise_image(0x1000, 4);
    let before = image.clone();
    let err = rewrite_checksums(&mut image, GameVersion::X, ActiveSlots::default(), &mut NoResign)
        .expect_err("image too small");
    assert_eq!(err.code, CoreErrorCode::ImageTooSmall);
    assert!(image == before);
}

#[test]
fn single_byte_edit_only_touches_that_blocks_checksum() {
    let (version, slots, image) = rewritten(Family::XY, 11);
    let target = 3;
    let offset = pksave_core::layout::block_offset(version, target) + 5;
    let slot = checksum_offsets(version, target).expect("slot").primary;

    let mut edited = image.clone();
    edited[offset] ^= 0x5A;
    let after_edit = edited.clone();
    rewrite_checksums(&mut edited, version, slots, &mut NoResign).expect("rewrite");

    let changed = changed_offsets(&after_edit, &edited);
    assert!(!changed.is_empty());
    assert!(
        changed.iter().all(|&o| o == slot || o == slot + 1),
        "unexpected writes at {changed:x?}"
    );
    assert_ne!(read_u16(&edited, slot), read_u16(&image, slot));
}

#[test]
fn generation_5_writes_primary_and_mirror() {
    for family in [Family::BlackWhite, Family::Black2White2] {
        let (version, _, image) = rewritten(family, 21);
        for index in 0..26 {
            let slots = checksum_offsets(version, index).expect("slot");
            let mirror = slots.mirror.expect("mirror slot");
            assert_eq!(
                read_u16(&image, slots.primary),
                read_u16(&image, mirror),
                "{family} block {index}"
            );
        }
    }
}

#[test]
fn generation_5_edit_updates_both_copies_of_one_checksum() {
    let (version, slots, image) = rewritten(Family::BlackWhite, 5);
    let block = checksum_offsets(version, 0).expect("slot");
    let mirror = block.mirror.expect("mirror slot");

    let mut edited = image.clone();
    edited[0x400 + 0x10] ^= 0xFF;
    let after_edit = edited.clone();
    rewrite_checksums(&mut edited, version, slots, &mut NoResign).expect("rewrite");

    let allowed = [block.primary, block.primary + 1, mirror, mirror + 1];
    let changed = changed_offsets(&after_edit, &edited);
    assert!(changed.iter().all(|o| allowed.contains(o)), "{changed:x?}");
    assert_eq!(read_u16(&edited, block.primary), read_u16(&edited, mirror));
}

#[test]
fn generation_4_hashes_the_authoritative_copies() {
    let version = GameVersion::HeartGold;
    let layout = gen4_layout(Family::HeartGoldSoulSilver).expect("layout");
    let slots = ActiveSlots::new(SlotIndex::Secondary, SlotIndex::Primary);
    let mut image = noise_image(0x80000, 77);
    let before = image.clone();

    rewrite_checksums(&mut image, version, slots, &mut NoResign).expect("rewrite");

    let general_base = GEN4_COPY_SHIFT;
    let general = crc16_ccitt(&image[general_base..general_base + layout.general_len]);
    assert_eq!(
        read_u16(&image, general_base + layout.general_checksum),
        general
    );

    let storage_start = layout.storage_start;
    let storage = crc16_ccitt(&image[storage_start..storage_start + layout.storage_len]);
    assert_eq!(read_u16(&image, layout.storage_checksum), storage);

    let mut expected = vec![
        general_base + layout.general_checksum,
        general_base + layout.general_checksum + 1,
        layout.storage_checksum,
        layout.storage_checksum + 1,
    ];
    expected.sort_unstable();
    let changed = changed_offsets(&before, &image);
    assert!(changed.iter().all(|o| expected.contains(o)), "{changed:x?}");
}

#[test]
fn sun_moon_invokes_resigner_once() {
    let mut image = noise_image(Family::SunMoon.image_len(), 8);
    let mut calls = 0;
    let mut resign = |_: &mut [u8]| calls += 1;
    let summary = rewrite_checksums(
        &mut image,
        GameVersion::Moon,
        ActiveSlots::default(),
        &mut resign,
    )
    .expect("rewrite");

    assert!(summary.resigned);
    assert_eq!(calls, 1);
}

#[test]
fn other_families_never_resign() {
    for family in Family::ALL {
        if family == Family::SunMoon {
            continue;
        }
        let mut image = noise_image(family.image_len(), 2);
        let mut calls = 0;
        let mut resign = |_: &mut [u8]| calls += 1;
        let summary = rewrite_checksums(
            &mut image,
            family.titles()[0],
            ActiveSlots::default(),
            &mut resign,
        )
        .expect("rewrite");
        assert!(!summary.resigned);
        assert_eq!(calls, 0, "{family}");
    }
}

#[test]
fn sun_moon_metadata_window_is_hashed_blank() {
    let version = GameVersion::Sun;
    let index = 36;
    let range = SM_TABLE.range(index).expect("block 36");
    let id_offset = SM_TABLE.block_id_offset(index).expect("info entry");
    let slot = checksum_offsets(version, index).expect("slot").primary;

    let mut image = noise_image(Family::SunMoon.image_len(), 36);
    image[id_offset..id_offset + 2].copy_from_slice(&36u16.to_le_bytes());
    let window = range.start + METADATA_RANGE.start..range.start + METADATA_RANGE.end;
    image[window.clone()].fill(0xCD);
    let metadata_before = image[window.clone()].to_vec();

    rewrite_checksums(&mut image, version, ActiveSlots::default(), &mut NoResign)
        .expect("rewrite");

    let mut blanked = image[range.as_range()].to_vec();
    blanked[METADATA_RANGE].fill(0);
    assert_eq!(read_u16(&image, slot), crc16_reflected(&blanked));
    assert_eq!(image[window.clone()], metadata_before[..]);

    let stored = read_u16(&image, slot);
    image[window].fill(0x11);
    rewrite_checksums(&mut image, version, ActiveSlots::default(), &mut NoResign)
        .expect("rewrite");
    assert_eq!(read_u16(&image, slot), stored);
}

#[test]
fn sun_moon_hashes_metadata_when_id_differs() {
    let version = GameVersion::Sun;
    let index = 36;
    let range = SM_TABLE.range(index).expect("block 36");
    let id_offset = SM_TABLE.block_id_offset(index).expect("info entry");
    let slot = checksum_offsets(version, index).expect("slot").primary;

    let mut image = noise_image(Family::SunMoon.image_len(), 35);
    image[id_offset..id_offset + 2].copy_from_slice(&35u16.to_le_bytes());
    rewrite_checksums(&mut image, version, ActiveSlots::default(), &mut NoResign)
        .expect("rewrite");

    assert_eq!(
        read_u16(&image, slot),
        crc16_reflected(&image[range.as_range()])
    );
}

#[test]
fn verify_flags_only_the_edited_block() {
    let (version, slots, mut image) = rewritten(Family::OmegaRubyAlphaSapphire, 13);
    let offset = pksave_core::layout::block_offset(version, 20) + 1;
    image[offset] = image[offset].wrapping_add(1);

    let report = verify_checksums(&image, version, slots).expect("verify");
    let invalid: Vec<usize> = report.invalid_blocks().iter().map(|b| b.index).collect();
    assert_eq!(invalid, vec![20]);
}

#[test]
fn verify_rejects_unknown_versions() {
    let image = vec![0u8; 0x10];
    let err = verify_checksums(&image, GameVersion::Unknown(1), ActiveSlots::default())
        .expect_err("unknown version");
    assert_eq!(err.code, CoreErrorCode::UnrecognizedFormat);
}

#[test]
fn edits_anywhere_are_repaired_by_rewrite() {
    fn prop(seed: u64, position: u32) -> TestResult {
        let family = Family::XY;
        let version = GameVersion::Y;
        let mut image = noise_image(family.image_len(), seed);
        let position = position as usize % image.len();
        image[position] ^= 0x80;
        if rewrite_checksums(&mut image, version, ActiveSlots::default(), &mut NoResign).is_err() {
            return TestResult::failed();
        }
        let report = match verify_checksums(&image, version, ActiveSlots::default()) {
            Ok(report) => report,
            Err(_) => return TestResult::failed(),
        };
        TestResult::from_bool(report.is_valid())
    }

    QuickCheck::new()
        .tests(8)
        .quickcheck(prop as fn(u64, u32) -> TestResult);
}
