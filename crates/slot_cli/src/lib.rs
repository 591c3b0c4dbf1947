use std::io::Write;
use std::path::PathBuf;

use engine::{resolve_app_paths, AppPaths, EraseOutcome, GameState, SaveLoadError, SaveStore};

#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    /// Project root holding `saves/`; resolved like the game does when absent.
    pub root: Option<PathBuf>,
    /// Explicit save file, overriding `root`.
    pub save: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Status,
    Show,
    Erase,
}

pub fn run<W: Write>(kind: CommandKind, options: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let store = resolve_store(&options)?;
    match kind {
        CommandKind::Status => status(&store, stdout),
        CommandKind::Show => show(&store, stdout),
        CommandKind::Erase => erase(&store, stdout),
    }
}

fn resolve_store(options: &CommonOptions) -> Result<SaveStore, String> {
    if let Some(save) = &options.save {
        return Ok(SaveStore::new(save.clone()));
    }
    let paths = match &options.root {
        Some(root) => AppPaths::from_root(root.clone()),
        None => resolve_app_paths().map_err(|error| error.to_string())?,
    };
    Ok(SaveStore::new(paths.save_file()))
}

fn status<W: Write>(store: &SaveStore, stdout: &mut W) -> Result<(), String> {
    let path = store.path().display().to_string();
    let line = match store.load() {
        Ok(state) => format!(
            "ok: {} at {} ({path})",
            state.hero.name, state.hero.current_location
        ),
        Err(SaveLoadError::NotFound { .. }) => format!("empty: no save at {path}"),
        Err(SaveLoadError::Corrupt { reason, .. }) => format!("corrupt: {reason} ({path})"),
    };
    write_line(stdout, &line)
}

fn show<W: Write>(store: &SaveStore, stdout: &mut W) -> Result<(), String> {
    let state = store.load().map_err(|error| error.to_string())?;
    for line in describe(&state) {
        write_line(stdout, &line)?;
    }
    Ok(())
}

fn erase<W: Write>(store: &SaveStore, stdout: &mut W) -> Result<(), String> {
    let path = store.path().display().to_string();
    match store.erase().map_err(|error| error.to_string())? {
        EraseOutcome::Deleted => write_line(stdout, &format!("deleted: {path}")),
        EraseOutcome::NotFound => write_line(stdout, &format!("empty: no save at {path}")),
    }
}

fn describe(state: &GameState) -> Vec<String> {
    let hero = &state.hero;
    let mut lines = vec![
        format!("hero: {}", hero.name),
        format!("location: {}", hero.current_location),
        format!(
            "position: {}",
            hero.last_position
                .map(|position| position.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "vitals: hp {}/{} gold {}",
            hero.vitals.health, hero.vitals.max_health, hero.vitals.gold
        ),
        format!("inventory: [{}]", hero.inventory.join(", ")),
    ];
    for (location, position) in &hero.departure_positions {
        lines.push(format!("departure: {location} {position}"));
    }
    for flag in &hero.flags {
        lines.push(format!("hero_flag: {flag}"));
    }
    for flag in &state.world_flags {
        lines.push(format!("world_flag: {flag}"));
    }
    lines
}

fn write_line<W: Write>(stdout: &mut W, line: &str) -> Result<(), String> {
    writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use engine::{Location, Vec2};
    use tempfile::TempDir;

    use super::*;

    fn options_for(temp: &TempDir) -> CommonOptions {
        CommonOptions {
            root: None,
            save: Some(temp.path().join("hero.save.json")),
        }
    }

    fn run_to_string(kind: CommandKind, options: CommonOptions) -> Result<String, String> {
        let mut out = Vec::new();
        run(kind, options, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    fn write_save(temp: &TempDir) {
        let mut state = GameState::new_game("Aria").expect("state");
        state.hero.current_location = Location::Swamp;
        state.hero.last_position = Some(Vec2::new(120.0, 40.5));
        state
            .hero
            .departure_positions
            .insert(Location::MapOverworld, Vec2::new(900.0, 300.0));
        state.hero.inventory.push("herb".to_string());
        state.set_world_flag("bridge_repaired");
        SaveStore::new(temp.path().join("hero.save.json"))
            .persist(&state)
            .expect("persist");
    }

    #[test]
    fn status_reports_empty_ok_and_corrupt_slots() {
        let temp = TempDir::new().expect("tempdir");
        let output = run_to_string(CommandKind::Status, options_for(&temp)).expect("status");
        assert!(output.starts_with("empty: no save at "));

        write_save(&temp);
        let output = run_to_string(CommandKind::Status, options_for(&temp)).expect("status");
        assert!(output.starts_with("ok: Aria at swamp"));

        fs::write(temp.path().join("hero.save.json"), "{ not json").expect("write");
        let output = run_to_string(CommandKind::Status, options_for(&temp)).expect("status");
        assert!(output.starts_with("corrupt: "));
    }

    #[test]
    fn show_lists_the_whole_record() {
        let temp = TempDir::new().expect("tempdir");
        write_save(&temp);
        let output = run_to_string(CommandKind::Show, options_for(&temp)).expect("show");
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "hero: Aria",
                "location: swamp",
                "position: (120.00, 40.50)",
                "vitals: hp 100/100 gold 120",
                "inventory: [herb]",
                "departure: map_overworld (900.00, 300.00)",
                "world_flag: bridge_repaired",
            ]
        );
    }

    #[test]
    fn show_fails_on_missing_slot() {
        let temp = TempDir::new().expect("tempdir");
        let error = run_to_string(CommandKind::Show, options_for(&temp)).expect_err("missing");
        assert!(error.contains("no save found"));
    }

    #[test]
    fn erase_deletes_once() {
        let temp = TempDir::new().expect("tempdir");
        write_save(&temp);
        let first = run_to_string(CommandKind::Erase, options_for(&temp)).expect("erase");
        assert!(first.starts_with("deleted: "));
        let second = run_to_string(CommandKind::Erase, options_for(&temp)).expect("erase");
        assert!(second.starts_with("empty: "));
    }

    #[test]
    fn root_option_points_at_the_saves_directory() {
        let temp = TempDir::new().expect("tempdir");
        let options = CommonOptions {
            root: Some(temp.path().to_path_buf()),
            save: None,
        };
        let store = resolve_store(&options).expect("store");
        assert_eq!(store.path(), temp.path().join("saves").join("hero.save.json"));
    }
}
