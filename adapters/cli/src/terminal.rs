//! Text front end: parses typed actions and describes the session.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use geocoin_core::{CellCoord, Coin, Command, Direction, Event, Transfer};
use geocoin_rendering::{text, Scene};
use geocoin_world::{query, World};

/// Help shown by the `help` action.
pub(crate) const HELP: &str = "\
Actions:
  n | s | e | w          step one cell north, south, east or west
  look                   list the caches around you
  collect I J  (c I J)   take the newest coin from the cache at I:J
  deposit I J  (d I J)   drop your newest coin into the cache at I:J
  take I J SERIAL        take the coin I:J#SERIAL from the cache holding it
  inventory    (i)       list the coins you carry
  reset                  forget everything and return to the start
  help                   show this message
  quit                   leave the game";

/// Single action typed by the player.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Action {
    /// Issue a command to the world.
    Play(Command),
    /// Describe the visible caches.
    Look,
    /// Describe the carried coins.
    Inventory,
    /// Print the help text.
    Help,
    /// Leave the game.
    Quit,
}

/// Parses one action such as `n`, `collect 1 2` or `take 0 0 3`.
pub(crate) fn parse_action(input: &str) -> Result<Action> {
    let mut words = input.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty action; type `help` for a list of actions");
    };
    let arguments: Vec<&str> = words.collect();

    let action = match verb.to_ascii_lowercase().as_str() {
        "n" | "north" => movement(Direction::North),
        "s" | "south" => movement(Direction::South),
        "e" | "east" => movement(Direction::East),
        "w" | "west" => movement(Direction::West),
        "look" | "l" => Action::Look,
        "inventory" | "i" => Action::Inventory,
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        "reset" => Action::Play(Command::ResetSession),
        "collect" | "c" => Action::Play(Command::Collect {
            cell: parse_cell(&arguments, verb)?,
        }),
        "deposit" | "d" => Action::Play(Command::Deposit {
            cell: parse_cell(&arguments, verb)?,
        }),
        "take" | "t" => Action::Play(Command::CollectCoin {
            coin: parse_coin(&arguments, verb)?,
        }),
        _ => bail!("unknown action `{verb}`; type `help` for a list of actions"),
    };

    let expected = match action {
        Action::Play(Command::Collect { .. } | Command::Deposit { .. }) => 2,
        Action::Play(Command::CollectCoin { .. }) => 3,
        _ => 0,
    };
    if arguments.len() != expected {
        bail!(
            "`{verb}` expects {expected} argument(s) but received {}",
            arguments.len()
        );
    }
    Ok(action)
}

/// Parses a comma separated script such as `n,e,c 1 2`.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Action>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .enumerate()
        .map(|(index, step)| {
            parse_action(step).with_context(|| format!("invalid script step {}", index + 1))
        })
        .collect()
}

fn movement(direction: Direction) -> Action {
    Action::Play(Command::MovePlayer { direction })
}

fn parse_cell(arguments: &[&str], verb: &str) -> Result<CellCoord> {
    let [i, j, ..] = arguments else {
        bail!("`{verb}` expects the cell as two integers I J");
    };
    let i = i
        .parse()
        .with_context(|| format!("`{i}` is not a valid cell row"))?;
    let j = j
        .parse()
        .with_context(|| format!("`{j}` is not a valid cell column"))?;
    Ok(CellCoord::new(i, j))
}

fn parse_coin(arguments: &[&str], verb: &str) -> Result<Coin> {
    let cell = parse_cell(arguments, verb)?;
    let Some(serial) = arguments.get(2) else {
        bail!("`{verb}` expects a coin as I J SERIAL");
    };
    let serial = serial
        .parse()
        .with_context(|| format!("`{serial}` is not a valid coin serial"))?;
    Ok(Coin::new(cell, serial))
}

/// Describes the player's position.
pub(crate) fn describe_position(world: &World) -> String {
    let position = query::player_position(world);
    format!(
        "You are at ({:.6}, {:.6}) in cell {}.",
        position.lat,
        position.lng,
        query::player_cell(world)
    )
}

/// Lists the caches drawn in `scene`, nearest first.
pub(crate) fn describe_caches(world: &World, scene: &Scene) -> String {
    let player = query::player_cell(world);
    let mut caches: Vec<_> = scene.caches.iter().collect();
    caches.sort_by_key(|cache| (cache.cell.chebyshev_distance(player), cache.cell));

    if caches.is_empty() {
        return "No caches nearby.".to_owned();
    }

    let mut description = String::new();
    for cache in caches {
        let _ = writeln!(
            description,
            "{}",
            text::popup_text(cache.cell, cache.coin_count)
        );
    }
    let _ = description.pop();
    description
}

/// Summarises what a batch of events changed, one line per notable event.
pub(crate) fn describe_events(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::CoinTransferred {
                coin,
                cell,
                transfer: Transfer::Collected,
            } => Some(format!("Collected coin {coin} from cache {cell}.")),
            Event::CoinTransferred {
                coin,
                cell,
                transfer: Transfer::Deposited,
            } => Some(format!("Deposited coin {coin} into cache {cell}.")),
            Event::PlayerMoved { to, .. } => Some(format!("Moved to cell {to}.")),
            Event::SessionReset { .. } => Some("Session reset.".to_owned()),
            _ => None,
        })
        .collect()
}

/// Describes the carried coins.
pub(crate) fn describe_inventory(scene: &Scene) -> String {
    format!(
        "Inventory ({}): {}",
        scene.inventory.len(),
        scene.status_text()
    )
}
