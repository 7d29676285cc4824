//! Per-problem limits as sent by the master.

use sandbox::Limits;
use yajudge_proto::{GradingLimits, ProblemData};

/// Decode wire limits. Negative values mean "not set", the same as zero.
pub fn from_wire(wire: &GradingLimits) -> Limits {
    let unsigned = |v: i32| u32::try_from(v).unwrap_or(0);
    Limits {
        stack_size_limit_mb: unsigned(wire.stack_size_limit_mb),
        memory_max_limit_mb: unsigned(wire.memory_max_limit_mb),
        cpu_time_limit_sec: unsigned(wire.cpu_time_limit_sec),
        real_time_limit_sec: unsigned(wire.real_time_limit_sec),
        proc_count_limit: unsigned(wire.proc_count_limit),
        fd_count_limit: unsigned(wire.fd_count_limit),
        stdout_size_limit_mb: unsigned(wire.stdout_size_limit_mb),
        stderr_size_limit_mb: unsigned(wire.stderr_size_limit_mb),
        allow_network: wire.allow_network,
        new_proc_delay_msec: unsigned(wire.new_proc_delay_msec),
    }
}

/// Node defaults overridden by whatever the problem sets.
pub fn for_problem(defaults: Limits, problem: Option<&ProblemData>) -> Limits {
    let wire = problem
        .and_then(|p| p.grading_options.as_ref())
        .and_then(|o| o.limits.as_ref());
    match wire {
        Some(wire) => defaults.updated_with(&from_wire(wire)),
        None => defaults,
    }
}

#[cfg(test)]
mod tests {
    use yajudge_proto::GradingOptions;

    use super::*;

    #[test]
    fn negative_wire_values_are_unset() {
        let wire = GradingLimits {
            stack_size_limit_mb: 16,
            memory_max_limit_mb: -1,
            cpu_time_limit_sec: i32::MIN,
            proc_count_limit: 50,
            new_proc_delay_msec: 10,
            allow_network: true,
            ..Default::default()
        };
        assert_eq!(
            from_wire(&wire),
            Limits {
                stack_size_limit_mb: 16,
                proc_count_limit: 50,
                new_proc_delay_msec: 10,
                allow_network: true,
                ..Limits::UNSET
            }
        );
    }

    #[test]
    fn problem_limits_override_node_defaults() {
        let problem = ProblemData {
            grading_options: Some(GradingOptions {
                limits: Some(GradingLimits {
                    memory_max_limit_mb: 512,
                    cpu_time_limit_sec: -5,
                    fd_count_limit: 100,
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };
        assert_eq!(
            for_problem(Limits::default(), Some(&problem)),
            Limits {
                memory_max_limit_mb: 512,
                fd_count_limit: 100,
                ..Limits::default()
            }
        );
    }

    #[test]
    fn missing_options_keep_defaults() {
        let defaults = Limits {
            stack_size_limit_mb: 8,
            ..Limits::default()
        };
        assert_eq!(for_problem(defaults, None), defaults);
        assert_eq!(for_problem(defaults, Some(&ProblemData::default())), defaults);
    }
}
