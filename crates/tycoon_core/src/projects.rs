//! Software projects: one in development at a time, released projects earn.

use rand::Rng;

use crate::{
    compute_stats, push_event, ActionError, Event, EventEnvelope, GameContent, GameState,
    ObjectiveKind, Project, ProjectId, ProjectKind,
};

/// Revenue lost per open bug at release.
pub const BUG_REVENUE_PENALTY: f64 = 0.02;
/// Bugs never cost more than this share of revenue.
pub const MAX_BUG_PENALTY: f64 = 0.5;
pub const XP_PER_COMPLEXITY: f64 = 10.0;

pub fn project_dir(id: &ProjectId) -> String {
    format!("/projects/{id}")
}

pub(crate) fn start(
    state: &mut GameState,
    content: &GameContent,
    name: &str,
    kind: ProjectKind,
    complexity: u32,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    if state.player.active_project.is_some() {
        return Err(ActionError::ProjectActive);
    }
    if complexity == 0 || name.trim().is_empty() {
        return Err(ActionError::CommandRejected(format!(
            "project needs a name and complexity, got {name:?}/{complexity}"
        )));
    }
    let constants = &content.constants;
    let id = ProjectId(format!("proj_{:04}", state.counters.next_project_id));
    state.counters.next_project_id += 1;

    let dir = project_dir(&id);
    let mut changes = state.files.create_folder(&dir)?;
    changes.extend(
        state
            .files
            .write_file(&format!("{dir}/README.md"), &format!("# {}\n", name.trim()))?,
    );

    let complexity_f = f64::from(complexity);
    state.player.active_project = Some(Project {
        id: id.clone(),
        name: name.trim().to_string(),
        kind,
        complexity,
        progress: 0.0,
        target_lines: complexity_f * constants.lines_per_complexity,
        bugs: 0,
        base_revenue: complexity_f * constants.revenue_per_complexity,
        revenue_per_visitor: constants.revenue_per_visitor,
        released_day: None,
    });

    push_event(state, events, Event::ProjectStarted { project_id: id });
    for change in changes {
        push_event(state, events, Event::FileChanged { change });
    }
    Ok(())
}

/// One manual burst of typing: `click_power` lines plus one bug roll.
pub(crate) fn write_code(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let player = &state.player;
    let stats = compute_stats(&player.equipped, &player.inventory, &player.unlocked_perks, content);
    let efficiency = crate::thermal::efficiency(player.is_overheating);
    let lines = stats.click_power * efficiency;
    let bug = crate::roll(rng, stats.bug_chance);

    state.player.lines_of_code += lines;
    let project = state.player.active_project.as_mut().map(|project| {
        project.progress += lines;
        if bug {
            project.bugs += 1;
        }
        project.id.clone()
    });
    if bug {
        state.player.total_bugs += 1;
        push_event(state, events, Event::BugIntroduced { project });
    }
    crate::corp::advance_objectives(state, content, ObjectiveKind::WriteLines, lines);
    Ok(())
}

pub fn release_revenue(project: &Project) -> f64 {
    let penalty = (f64::from(project.bugs) * BUG_REVENUE_PENALTY).min(MAX_BUG_PENALTY);
    project.base_revenue * (1.0 - penalty)
}

pub(crate) fn release(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let mut project = state
        .player
        .active_project
        .take()
        .ok_or(ActionError::NoActiveProject)?;
    if !project.is_complete() {
        return Err(ActionError::ProjectIncomplete {
            progress: project.progress,
            target: project.target_lines,
        });
    }

    project.base_revenue = release_revenue(&project);
    project.released_day = Some(state.clock.day);
    let complexity = f64::from(project.complexity);
    let xp = (complexity * XP_PER_COMPLEXITY * content.constants.xp_multiplier).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        state.player.xp = state.player.xp.saturating_add(xp.max(0.0) as u64);
    }

    let (project_id, base_revenue) = (project.id.clone(), project.base_revenue);
    let reputation = i64::from(project.complexity);
    state.player.released_projects.push(project);

    let tier_change = crate::progression::adjust_reputation(state, reputation);
    crate::corp::advance_objectives(state, content, ObjectiveKind::ReleaseProjects, 1.0);
    push_event(
        state,
        events,
        Event::ProjectReleased {
            project_id,
            base_revenue,
        },
    );
    if let Some(event) = tier_change {
        push_event(state, events, event);
    }
    Ok(())
}

pub(crate) fn set_crunch(state: &mut GameState, enabled: bool, events: &mut Vec<EventEnvelope>) {
    if state.player.crunch_mode != enabled {
        state.player.crunch_mode = enabled;
        push_event(state, events, Event::CrunchModeChanged { enabled });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{always_rng, base_content, base_state, never_rng};

    #[test]
    fn only_one_project_at_a_time() {
        let content = base_content();
        let mut state = base_state(&content);
        start(&mut state, &content, "Todo app", ProjectKind::App, 2, &mut Vec::new()).unwrap();
        assert_eq!(
            start(&mut state, &content, "Blog", ProjectKind::Website, 1, &mut Vec::new()),
            Err(ActionError::ProjectActive)
        );
    }

    #[test]
    fn starting_creates_project_folder() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut events = Vec::new();
        start(&mut state, &content, "Todo app", ProjectKind::App, 2, &mut events).unwrap();
        assert!(state.files.resolve("/projects/proj_0000/README.md").is_some());
        assert!(events
            .iter()
            .any(|e| matches!(e.event, Event::FileChanged { .. })));
        let project = state.player.active_project.as_ref().unwrap();
        assert!((project.target_lines - 200.0).abs() < 1e-9);
    }

    #[test]
    fn write_code_adds_click_power_lines() {
        let content = base_content();
        let mut state = base_state(&content);
        start(&mut state, &content, "Todo app", ProjectKind::App, 1, &mut Vec::new()).unwrap();
        write_code(&mut state, &content, &mut never_rng(), &mut Vec::new()).unwrap();
        let project = state.player.active_project.as_ref().unwrap();
        assert!((project.progress - 1.0).abs() < 1e-9);
        assert_eq!(project.bugs, 0);

        write_code(&mut state, &content, &mut always_rng(), &mut Vec::new()).unwrap();
        assert_eq!(state.player.active_project.as_ref().unwrap().bugs, 1);
        assert_eq!(state.player.total_bugs, 1);
    }

    #[test]
    fn release_requires_finished_code() {
        let content = base_content();
        let mut state = base_state(&content);
        start(&mut state, &content, "Todo app", ProjectKind::App, 1, &mut Vec::new()).unwrap();
        let result = release(&mut state, &content, &mut Vec::new());
        assert!(matches!(result, Err(ActionError::ProjectIncomplete { .. })));
    }

    #[test]
    fn release_pays_out_reputation_and_scales_revenue_by_bugs() {
        let content = base_content();
        let mut state = base_state(&content);
        start(&mut state, &content, "Todo app", ProjectKind::App, 5, &mut Vec::new()).unwrap();
        if let Some(project) = state.player.active_project.as_mut() {
            project.progress = project.target_lines;
            project.bugs = 10;
        }
        release(&mut state, &content, &mut Vec::new()).unwrap();
        let released = &state.player.released_projects[0];
        // 5 * 6 = 30, minus 20% for ten bugs
        assert!((released.base_revenue - 24.0).abs() < 1e-9);
        assert_eq!(state.player.reputation, 5);
        assert_eq!(state.player.xp, 50);
        assert!(state.player.active_project.is_none());
    }

    #[test]
    fn bug_penalty_is_capped() {
        let project = Project {
            id: ProjectId::from("p"),
            name: "p".into(),
            kind: ProjectKind::Library,
            complexity: 1,
            progress: 0.0,
            target_lines: 0.0,
            bugs: 500,
            base_revenue: 100.0,
            revenue_per_visitor: 0.0,
            released_day: None,
        };
        assert!((release_revenue(&project) - 50.0).abs() < 1e-9);
    }
}
