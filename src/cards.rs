//! Starter card set.
//!
//! A small fixed pool exercising every part of the content vocabulary:
//! vanilla and keyworded followers, an activated drawer, a staged location,
//! targeted and modal events and two custom-resolved effects. Both starter
//! decks share the same list; games diverge through the shuffle seed.

use crate::card::{Ability, CardDefinition, CardDefinitionBuilder, Mode};
use crate::effect::{CardFilter, Effect, ExpiryTrigger, LastingKind, PlayerSelector, TargetSelector};
use crate::error::EngineError;
use crate::game_state::{DeckConfig, GameConfig};
use crate::ids::DefinitionId;
use crate::registry::CardRegistry;
use crate::types::{CardType, Guild, Keyword};

pub const PYRRHEXIS: DefinitionId = DefinitionId(1);
pub const EMBER_VANGUARD: DefinitionId = DefinitionId(2);
pub const THORNWALL_SENTINEL: DefinitionId = DefinitionId(3);
pub const GALE_SKIRMISHER: DefinitionId = DefinitionId(4);
pub const STONEBOUND_COLOSSUS: DefinitionId = DefinitionId(5);
pub const VEILED_WATCHER: DefinitionId = DefinitionId(6);
pub const VEIL_INITIATE: DefinitionId = DefinitionId(7);
pub const SEARING_VOLLEY: DefinitionId = DefinitionId(8);
pub const WAR_BANNER: DefinitionId = DefinitionId(9);
pub const RITE_OF_TRIBUTE: DefinitionId = DefinitionId(10);
pub const GUILDMOOT_EDICT: DefinitionId = DefinitionId(11);
pub const FORGEWORKS: DefinitionId = DefinitionId(12);

fn definitions() -> Vec<CardDefinition> {
    vec![
        CardDefinitionBuilder::new(
            PYRRHEXIS,
            "Pyrrhexis, the Ashen Crown",
            CardType::Worldbreaker,
            Guild::Ember,
        )
        .ability(
            Ability::rally(vec![Effect::GainMythium {
                player: PlayerSelector::Controller,
                amount: 1,
            }])
            .with_text("Rally: gain 1 mythium."),
        )
        .ability(
            Ability::activated_custom(2, "worldbreaker_breach")
                .with_text("2: deal 2 wounds to an opposing board card."),
        )
        .build(),
        CardDefinitionBuilder::new(
            EMBER_VANGUARD,
            "Ember Vanguard",
            CardType::Follower,
            Guild::Ember,
        )
        .cost(2)
        .stats(3, 2)
        .keyword(Keyword::Bloodshed)
        .build(),
        CardDefinitionBuilder::new(
            THORNWALL_SENTINEL,
            "Thornwall Sentinel",
            CardType::Follower,
            Guild::Thorn,
        )
        .cost(2)
        .stats(1, 4)
        .build(),
        CardDefinitionBuilder::new(
            GALE_SKIRMISHER,
            "Gale Skirmisher",
            CardType::Follower,
            Guild::Gale,
        )
        .cost(1)
        .stats(2, 1)
        .build(),
        CardDefinitionBuilder::new(
            STONEBOUND_COLOSSUS,
            "Stonebound Colossus",
            CardType::Follower,
            Guild::Stone,
        )
        .cost(5)
        .stats(6, 6)
        .keyword(Keyword::Overwhelm)
        .standing(Guild::Stone, 2)
        .build(),
        CardDefinitionBuilder::new(
            VEILED_WATCHER,
            "Veiled Watcher",
            CardType::Follower,
            Guild::Veil,
        )
        .cost(2)
        .stats(0, 3)
        .keyword(Keyword::Stationary)
        .ability(
            Ability::activated(
                1,
                vec![Effect::Draw {
                    player: PlayerSelector::Controller,
                    count: 1,
                }],
            )
            .with_text("1: draw a card."),
        )
        .build(),
        CardDefinitionBuilder::new(
            VEIL_INITIATE,
            "Veil Initiate",
            CardType::Follower,
            Guild::Veil,
        )
        .cost(1)
        .stats(1, 1)
        .ability(
            Ability::on_play(vec![Effect::Draw {
                player: PlayerSelector::Controller,
                count: 1,
            }])
            .with_text("On play: draw a card."),
        )
        .build(),
        CardDefinitionBuilder::new(
            SEARING_VOLLEY,
            "Searing Volley",
            CardType::Event,
            Guild::Ember,
        )
        .cost(1)
        .ability(
            Ability::on_play(vec![Effect::DealWounds {
                target: TargetSelector::Choose {
                    filter: CardFilter::board_followers(),
                    count: 2,
                },
                amount: 2,
            }])
            .with_text("Deal 2 wounds to up to 2 followers."),
        )
        .build(),
        CardDefinitionBuilder::new(WAR_BANNER, "War Banner", CardType::Event, Guild::Gale)
            .cost(1)
            .ability(
                Ability::on_play(vec![Effect::Lasting {
                    target: TargetSelector::All(
                        CardFilter::board_followers().with_owner(PlayerSelector::Controller),
                    ),
                    kind: LastingKind::StrengthModifier(2),
                    expires: ExpiryTrigger::EndOfRound,
                }])
                .with_text("Your followers get +2 strength this round."),
            )
            .build(),
        CardDefinitionBuilder::new(
            RITE_OF_TRIBUTE,
            "Rite of Tribute",
            CardType::Event,
            Guild::Veil,
        )
        .cost(1)
        .ability(
            Ability::on_play_custom("rite_of_tribute")
                .with_text("Each player discards a card. Gain 1 power."),
        )
        .build(),
        CardDefinitionBuilder::new(
            GUILDMOOT_EDICT,
            "Guildmoot Edict",
            CardType::Event,
            Guild::Stone,
        )
        .cost(1)
        .mode(Mode::new(
            "Muster",
            vec![Effect::Draw {
                player: PlayerSelector::Controller,
                count: 2,
            }],
        ))
        .mode(Mode::new(
            "Treasury",
            vec![Effect::GainMythium {
                player: PlayerSelector::Controller,
                amount: 2,
            }],
        ))
        .mode(Mode::new(
            "Censure",
            vec![Effect::DealWounds {
                target: TargetSelector::Choose {
                    filter: CardFilter::board_followers(),
                    count: 1,
                },
                amount: 2,
            }],
        ))
        .build(),
        CardDefinitionBuilder::new(FORGEWORKS, "Forgeworks", CardType::Location, Guild::Stone)
            .cost(2)
            .stages(3)
            .ability(
                Ability::activated(
                    0,
                    vec![
                        Effect::GainMythium {
                            player: PlayerSelector::Controller,
                            amount: 1,
                        },
                        Effect::AdvanceStage,
                    ],
                )
                .with_text("0: gain 1 mythium, then remove a stage counter."),
            )
            .build(),
    ]
}

/// Registry holding the whole starter set.
pub fn starter_registry() -> Result<CardRegistry, EngineError> {
    let mut registry = CardRegistry::new();
    for definition in definitions() {
        registry.register(definition)?;
    }
    Ok(registry)
}

fn starter_deck() -> Vec<DefinitionId> {
    vec![
        EMBER_VANGUARD,
        EMBER_VANGUARD,
        THORNWALL_SENTINEL,
        THORNWALL_SENTINEL,
        GALE_SKIRMISHER,
        GALE_SKIRMISHER,
        STONEBOUND_COLOSSUS,
        VEILED_WATCHER,
        VEIL_INITIATE,
        SEARING_VOLLEY,
        WAR_BANNER,
        RITE_OF_TRIBUTE,
        GUILDMOOT_EDICT,
        FORGEWORKS,
    ]
}

/// A symmetric two-player configuration over the starter set.
pub fn starter_config(seed: u64) -> GameConfig {
    GameConfig {
        player1: DeckConfig {
            worldbreaker: PYRRHEXIS,
            deck: starter_deck(),
        },
        player2: DeckConfig {
            worldbreaker: PYRRHEXIS,
            deck: starter_deck(),
        },
        seed,
    }
}
