use pksave_core::core_api::CoreErrorCode;
use pksave_core::layout::{GEN4_COPY_SHIFT, Gen4Layout, gen4_layout};
use pksave_core::{
    ActiveSlots, GameVersion, SlotIndex, locate_active_slots, locate_general_block,
    locate_storage_block,
};

const GEN4_VERSIONS: [GameVersion; 3] = [
    GameVersion::Diamond,
    GameVersion::Platinum,
    GameVersion::HeartGold,
];

fn layout_of(version: GameVersion) -> &'static Gen4Layout {
    version
        .family()
        .and_then(gen4_layout)
        .expect("generation 4 version")
}

fn blank_gen4_image() -> Vec<u8> {
    (0..0x80000usize).map(|i| (i % 251) as u8).collect()
}

fn put_u16(image: &mut [u8], offset: usize, value: u16) {
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn erase(image: &mut [u8], offset: usize) {
    image[offset..offset + 10].fill(0xFF);
}

fn with_general_counters(version: GameVersion, first: u16, second: u16) -> Vec<u8> {
    let layout = layout_of(version);
    let mut image = blank_gen4_image();
    put_u16(&mut image, layout.general_counter, first);
    put_u16(&mut image, layout.general_counter + GEN4_COPY_SHIFT, second);
    image
}

fn with_storage_counters(version: GameVersion, first: u16, second: u16) -> Vec<u8> {
    let layout = layout_of(version);
    let mut image = blank_gen4_image();
    put_u16(&mut image, layout.storage_footer, first);
    put_u16(&mut image, layout.storage_footer + GEN4_COPY_SHIFT, second);
    image
}

#[test]
fn general_block_prefers_higher_counter() {
    for version in GEN4_VERSIONS {
        let image = with_general_counters(version, 5, 3);
        assert_eq!(locate_general_block(&image, version), Ok(SlotIndex::Primary));

        let image = with_general_counters(version, 3, 5);
        assert_eq!(
            locate_general_block(&image, version),
            Ok(SlotIndex::Secondary),
            "{version}"
        );
    }
}

#[test]
fn general_block_tie_goes_to_first_copy() {
    for version in GEN4_VERSIONS {
        let image = with_general_counters(version, 5, 5);
        assert_eq!(locate_general_block(&image, version), Ok(SlotIndex::Primary));
    }
}

#[test]
fn erased_first_general_copy_selects_second_regardless_of_counters() {
    for version in GEN4_VERSIONS {
        let mut image = with_general_counters(version, 9, 1);
        erase(&mut image, 0);
        assert_eq!(
            locate_general_block(&image, version),
            Ok(SlotIndex::Secondary),
            "{version}"
        );
    }
}

#[test]
fn erased_second_general_copy_still_selects_second() {
    for version in GEN4_VERSIONS {
        let mut image = with_general_counters(version, 9, 1);
        erase(&mut image, GEN4_COPY_SHIFT);
        assert_eq!(
            locate_general_block(&image, version),
            Ok(SlotIndex::Secondary),
            "{version}"
        );
    }
}

#[test]
fn fully_erased_second_general_copy_selects_second() {
    let version = GameVersion::Diamond;
    let mut image = with_general_counters(version, 7, 0);
    image[GEN4_COPY_SHIFT..].fill(0xFF);
    assert_eq!(
        locate_general_block(&image, version),
        Ok(SlotIndex::Secondary)
    );
}

#[test]
fn counters_compare_as_little_endian_u16() {
    let version = GameVersion::HeartGold;
    // 0x0100 > 0x00FF only when read little-endian.
    let image = with_general_counters(version, 0x0100, 0x00FF);
    assert_eq!(locate_general_block(&image, version), Ok(SlotIndex::Primary));
}

#[test]
fn storage_block_prefers_higher_counter() {
    for version in GEN4_VERSIONS {
        let image = with_storage_counters(version, 5, 3);
        assert_eq!(locate_storage_block(&image, version), Ok(SlotIndex::Primary));

        let image = with_storage_counters(version, 3, 5);
        assert_eq!(
            locate_storage_block(&image, version),
            Ok(SlotIndex::Secondary),
            "{version}"
        );

        let image = with_storage_counters(version, 5, 5);
        assert_eq!(locate_storage_block(&image, version), Ok(SlotIndex::Primary));
    }
}

#[test]
fn erased_storage_copies_select_the_other() {
    for version in GEN4_VERSIONS {
        let footer = layout_of(version).storage_footer;

        let mut image = with_storage_counters(version, 9, 1);
        erase(&mut image, footer);
        assert_eq!(
            locate_storage_block(&image, version),
            Ok(SlotIndex::Secondary)
        );

        let mut image = with_storage_counters(version, 1, 9);
        erase(&mut image, footer + GEN4_COPY_SHIFT);
        assert_eq!(locate_storage_block(&image, version), Ok(SlotIndex::Primary));
    }
}

#[test]
fn general_and_storage_are_located_independently() {
    let version = GameVersion::Platinum;
    let layout = layout_of(version);
    let mut image = blank_gen4_image();
    put_u16(&mut image, layout.general_counter, 2);
    put_u16(&mut image, layout.general_counter + GEN4_COPY_SHIFT, 7);
    put_u16(&mut image, layout.storage_footer, 8);
    put_u16(&mut image, layout.storage_footer + GEN4_COPY_SHIFT, 4);

    assert_eq!(
        locate_active_slots(&image, version),
        Ok(ActiveSlots::new(SlotIndex::Secondary, SlotIndex::Primary))
    );
}

#[test]
fn short_gen4_image_is_rejected() {
    let image = vec![0u8; 0x40000];
    let err = locate_general_block(&image, GameVersion::Pearl).expect_err("image too small");
    assert_eq!(err.code, CoreErrorCode::ImageTooSmall);
}

#[test]
fn newer_generations_and_unknown_versions_default_to_first_copy() {
    let image = vec![0xFFu8; 0x100];
    for version in [
        GameVersion::Black,
        GameVersion::Y,
        GameVersion::Moon,
        GameVersion::Unknown(0),
    ] {
        assert_eq!(
            locate_active_slots(&image, version),
            Ok(ActiveSlots::default())
        );
    }
}
