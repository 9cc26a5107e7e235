use super::types::Pass;

/// Decides which passes to track when they overlap.
///
/// Expects `passes` sorted by AOS. Walking forward, a pass still marked
/// `take` is compared with the passes that start before it ends: the one
/// with the lower priority value keeps `take`, and once the current pass
/// loses, the pass that beat it takes over the walk.
pub fn resolve_conflicts(passes: &mut [Pass]) {
    for i in 0..passes.len() {
        if !passes[i].take {
            continue;
        }
        for j in i + 1..passes.len() {
            if passes[i].los <= passes[j].aos {
                break;
            }
            if passes[i].priority < passes[j].priority {
                passes[j].take = false;
            } else {
                passes[i].take = false;
                passes[j].take = true;
                break;
            }
        }
    }
}
