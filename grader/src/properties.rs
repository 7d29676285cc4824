use yajudge_proto::{Arch, ConnectedServiceProperties, GradingPlatform, ServiceRole};

/// Architecture reported to the master for this build of the grader.
pub fn host_arch() -> Arch {
    arch_from_name(std::env::consts::ARCH)
}

fn arch_from_name(name: &str) -> Arch {
    match name {
        "x86" => Arch::X86,
        "x86_64" => Arch::X8664,
        "arm" => Arch::Armv7,
        "aarch64" => Arch::Aarch64,
        _ => Arch::Any,
    }
}

/// Greeting sent when opening the submission stream and with every status push.
pub fn service_properties(
    name: &str,
    arch_specific_only: bool,
    workers: usize,
    performance_rating: f64,
) -> ConnectedServiceProperties {
    ConnectedServiceProperties {
        name: name.to_string(),
        platform: Some(GradingPlatform {
            arch: host_arch() as i32,
        }),
        performance_rating,
        arch_specific_only_jobs: arch_specific_only,
        number_of_workers: i32::try_from(workers).unwrap_or(i32::MAX),
        role: ServiceRole::ServiceGrading as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_mapping() {
        assert_eq!(arch_from_name("x86_64"), Arch::X8664);
        assert_eq!(arch_from_name("aarch64"), Arch::Aarch64);
        assert_eq!(arch_from_name("arm"), Arch::Armv7);
        assert_eq!(arch_from_name("riscv64"), Arch::Any);
    }

    #[test]
    fn greeting_fields() {
        let props = service_properties("node-1", true, 4, 12.5);
        assert_eq!(props.name, "node-1");
        assert_eq!(props.number_of_workers, 4);
        assert!(props.arch_specific_only_jobs);
        assert_eq!(props.performance_rating, 12.5);
        assert_eq!(props.role(), ServiceRole::ServiceGrading);
        assert_eq!(props.platform.unwrap().arch(), host_arch());
    }
}
