//! The fixed-point driver that applies rules to a dataflow.
//!
//! Each pass walks the graph in topological order and applies the first
//! matching rule at each node. After any structural change the walk starts
//! over from a fresh order. Passes repeat until one makes no change or the
//! pass cap is reached.

use common_config::{OptimizerSettings, SluiceConfig};
use common_error::{SluiceError, SluiceResult};
use log::{debug, trace, warn};
use sluice_dataflow::Dataflow;
use sluice_dataflow::debug::find_broken_link;

use super::rule::{OptimizationReport, RewriteRule, RuleTrace};

/// Configuration for the optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Maximum number of passes before stopping.
    pub max_passes: usize,
    /// Optional cap on the rewrites within one pass. A zero cap is treated
    /// as one.
    pub rewrite_budget_per_pass: Option<usize>,
    /// Check link consistency after every pass.
    pub check_links: bool,
    /// Whether to enable detailed tracing.
    pub enable_trace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::from(&OptimizerSettings::default())
    }
}

impl From<&OptimizerSettings> for OptimizerConfig {
    fn from(settings: &OptimizerSettings) -> Self {
        Self {
            max_passes: settings.max_passes,
            rewrite_budget_per_pass: settings.rewrite_budget_per_pass,
            check_links: settings.check_links,
            enable_trace: settings.enable_trace,
        }
    }
}

impl OptimizerConfig {
    /// Create a new config with the given pass cap.
    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = max;
        self
    }

    /// Limit the rewrites a single pass may apply (at least one).
    pub fn with_rewrite_budget(mut self, budget: usize) -> Self {
        self.rewrite_budget_per_pass = Some(budget.max(1));
        self
    }

    fn rewrite_budget(&self) -> Option<usize> {
        self.rewrite_budget_per_pass.map(|budget| budget.max(1))
    }

    /// Enable or disable link checking after every pass.
    pub fn with_check_links(mut self, enable: bool) -> Self {
        self.check_links = enable;
        self
    }

    /// Enable or disable tracing.
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }

    fn links_checked(&self) -> bool {
        self.check_links || cfg!(debug_assertions) || cfg!(feature = "check-links")
    }
}

/// The optimizer that rewrites a dataflow to a fixed point.
///
/// # Termination
///
/// A pass ends after a full walk with no change. Every default rule removes a
/// node or an ordering inversion, so a pass of default rules always ends.
/// Custom rules that can undo each other need a rewrite budget, which cuts a
/// pass short; a cut pass is never taken for a fixed point. At most
/// `max_passes` passes run. A run that stops at the cap without a quiet pass
/// is reported as not converged; the graph is still valid and the caller
/// decides whether to use it.
pub struct Optimizer {
    /// The rules to apply (in priority order).
    rules: Vec<Box<dyn RewriteRule>>,
    /// Configuration.
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create a new optimizer with the given rules.
    pub fn new(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self {
            rules,
            config: OptimizerConfig::default(),
        }
    }

    /// Create a new optimizer with custom config.
    pub fn with_config(rules: Vec<Box<dyn RewriteRule>>, config: OptimizerConfig) -> Self {
        Self { rules, config }
    }

    /// The default rule set configured from a [`SluiceConfig`].
    pub fn from_config(config: &SluiceConfig) -> Self {
        Self::with_config(Self::default_rules(), OptimizerConfig::from(&config.optimizer))
    }

    /// The default rules in priority order.
    pub fn default_rules() -> Vec<Box<dyn RewriteRule>> {
        use super::{DeadNodeElimination, DuplicateMerge, FilterHoisting, FilterReordering};

        vec![
            Box::new(DeadNodeElimination),
            Box::new(DuplicateMerge),
            Box::new(FilterHoisting),
            Box::new(FilterReordering),
        ]
    }

    /// Add a rule after the existing ones.
    pub fn add_rule<R: RewriteRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// The active configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Rewrite the dataflow in place until it stops changing.
    pub fn optimize(&self, graph: &mut Dataflow) -> SluiceResult<OptimizationReport> {
        let mut report = OptimizationReport::default();

        while report.passes < self.config.max_passes {
            report.passes += 1;
            let outcome = self.run_pass(graph, report.passes, &mut report)?;
            self.check_links(graph)?;

            if outcome.is_quiet() {
                debug!("No changes in pass {}, reached fixpoint", report.passes);
                report.converged = true;
                break;
            }
            debug!("Pass {} applied {} rewrites", report.passes, outcome.applied);
        }

        if !report.converged {
            warn!(
                "Optimizer reached max passes ({}) without a fixed point, {} rewrites applied",
                self.config.max_passes, report.rewrites_applied
            );
        }

        Ok(report)
    }

    /// Run a single pass (no fixpoint iteration).
    pub fn optimize_once(&self, graph: &mut Dataflow) -> SluiceResult<OptimizationReport> {
        let mut report = OptimizationReport {
            passes: 1,
            ..Default::default()
        };

        let outcome = self.run_pass(graph, 1, &mut report)?;
        self.check_links(graph)?;
        report.converged = outcome.is_quiet();

        Ok(report)
    }

    /// Walk the graph, restarting after every change.
    fn run_pass(
        &self,
        graph: &mut Dataflow,
        pass: usize,
        report: &mut OptimizationReport,
    ) -> SluiceResult<PassOutcome> {
        let budget = self.config.rewrite_budget();
        let mut applied = 0;

        'walk: loop {
            if let Some(budget) = budget.filter(|budget| applied >= *budget) {
                debug!("Pass {pass} spent its budget of {budget} rewrites");
                return Ok(PassOutcome {
                    applied,
                    exhausted: true,
                });
            }

            for node in graph.topological_order()? {
                for rule in &self.rules {
                    if !rule.matches(node, graph) {
                        continue;
                    }

                    let before = self.config.enable_trace.then(|| graph.explain());
                    let rewrite = rule.apply(node, graph)?;
                    if !rewrite.is_change() {
                        trace!("Rule '{}' matched {node} but left it unchanged", rule.name());
                        continue;
                    }

                    applied += 1;
                    report.record(rule.name());
                    debug!("Rule '{}' applied to {node} in pass {pass}: {rewrite}", rule.name());

                    if let Some(before) = before {
                        report.trace.push(RuleTrace::new(
                            rule.name(),
                            pass,
                            node,
                            rewrite,
                            before,
                            graph.explain(),
                        ));
                    }
                    continue 'walk;
                }
            }

            return Ok(PassOutcome {
                applied,
                exhausted: false,
            });
        }
    }

    fn check_links(&self, graph: &Dataflow) -> SluiceResult<()> {
        if !self.config.links_checked() {
            return Ok(());
        }
        match find_broken_link(graph, &graph.node_ids()) {
            Some(problem) => Err(SluiceError::inconsistent_links(problem)),
            None => Ok(()),
        }
    }
}

/// What a single pass did.
#[derive(Debug, Clone, Copy)]
struct PassOutcome {
    applied: usize,
    /// The pass stopped on its rewrite budget, not on a clean walk.
    exhausted: bool,
}

impl PassOutcome {
    fn is_quiet(&self) -> bool {
        self.applied == 0 && !self.exhausted
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}
