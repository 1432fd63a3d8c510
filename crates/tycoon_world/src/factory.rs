use rand::Rng;
use tycoon_core::files::FileTree;
use tycoon_core::{
    mint_uid, CorpStanding, CorpState, CorporationReputation, GameContent, GameState,
    InventoryItem, MetaState, PlayerId, PlayerState, SCHEMA_VERSION,
};

/// Folders every new virtual filesystem starts with.
pub const INITIAL_FOLDERS: [&str; 3] = ["/projects", "/documents", "/downloads"];

/// A brand-new career: starting balances from the constants, the starter
/// kit minted and equipped, neutral standing with every corporation.
pub fn build_initial_state(
    content: &GameContent,
    seed: u64,
    player_id: &str,
    rng: &mut impl Rng,
) -> GameState {
    let c = &content.constants;
    let mut player = PlayerState {
        money: c.starting_money,
        shadow_credits: c.starting_shadow_credits,
        ..PlayerState::default()
    };

    let mut serial = 0;
    for item_id in &c.starter_kit {
        let Some(slot) = content.items.get(item_id).and_then(|def| def.slot) else {
            continue;
        };
        serial += 1;
        let uid = mint_uid(rng, serial);
        player.inventory.push(InventoryItem {
            uid: uid.clone(),
            item_id: item_id.clone(),
            is_stolen: false,
            durability: 100.0,
        });
        player.equipped.entry(slot).or_insert(uid);
    }

    let mut files = FileTree::new();
    for folder in INITIAL_FOLDERS {
        let created = files.create_folder(folder);
        debug_assert!(created.is_ok(), "initial folder {folder}: {created:?}");
    }

    let mut state = GameState {
        meta: MetaState {
            tick: 0,
            seed,
            schema_version: SCHEMA_VERSION,
            content_version: content.content_version.clone(),
            player_id: PlayerId::from(player_id),
        },
        player,
        corp: CorpState {
            reputations: content
                .corporations
                .iter()
                .map(|corp| CorporationReputation {
                    corp_id: corp.id.clone(),
                    reputation: 0,
                    standing: CorpStanding::Neutral,
                })
                .collect(),
            ..CorpState::default()
        },
        files,
        ..GameState::default()
    };
    state.counters.next_item_serial = serial;
    state
}
