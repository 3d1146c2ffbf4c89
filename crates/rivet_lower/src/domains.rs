//! Clock-domain resolution.
//!
//! The first lowering pass: every domain name referenced by a synchronous
//! statement list must correspond to a declared [`ClockDomain`] before any
//! later pass runs. Missing domains are either created implicitly, with
//! fresh clock/reset signals that become required top-level ports, or
//! reported as [`LowerError::UnresolvedClockDomain`].

use crate::error::LowerError;
use crate::LowerConfig;
use rivet_ir::{ClockDomain, Design, Fragment, SignalId, SignalSpec};

/// Resolves undeclared domains, returning the fresh port signals created.
///
/// Missing domains are visited in name order; each creates a 1-bit clock
/// named `<domain>_clk` and, unless the config suppresses resets, a 1-bit
/// reset named `<domain>_rst`.
pub fn resolve_domains(
    fragment: &mut Fragment,
    design: &mut Design,
    config: &LowerConfig,
) -> Result<Vec<SignalId>, LowerError> {
    let mut new_ports = Vec::new();
    for name in fragment.undeclared_domains() {
        if !config.create_missing_domains {
            return Err(LowerError::UnresolvedClockDomain(name));
        }
        let clock = design.add_signal(SignalSpec::new(1).named(&format!("{name}_clk")));
        new_ports.push(clock);
        let reset = if config.reset_less_domains {
            None
        } else {
            let rst = design.add_signal(SignalSpec::new(1).named(&format!("{name}_rst")));
            new_ports.push(rst);
            Some(rst)
        };
        fragment.add_domain(ClockDomain {
            name,
            clock,
            reset,
        });
    }
    Ok(new_ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_ir::Statement;

    fn fragment_with_sync(domain: &str) -> (Design, Fragment) {
        let mut design = Design::new();
        let q = design.add_signal(SignalSpec::new(8));
        let mut fragment = Fragment::new();
        fragment.push_sync(domain, Statement::assign(q, 1i64));
        (design, fragment)
    }

    #[test]
    fn creates_exactly_one_domain_with_ports() {
        let (mut design, mut fragment) = fragment_with_sync("io");
        let ports = resolve_domains(&mut fragment, &mut design, &LowerConfig::default()).unwrap();

        assert_eq!(fragment.clock_domains.len(), 1);
        let cd = fragment.domain("io").unwrap();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0], cd.clock);
        assert_eq!(Some(ports[1]), cd.reset);
        assert_eq!(design.signal(cd.clock).name_override.as_deref(), Some("io_clk"));
        assert_eq!(
            design.signal(cd.reset.unwrap()).name_override.as_deref(),
            Some("io_rst")
        );
    }

    #[test]
    fn disabled_creation_fails() {
        let (mut design, mut fragment) = fragment_with_sync("io");
        let config = LowerConfig {
            create_missing_domains: false,
            ..LowerConfig::default()
        };
        let err = resolve_domains(&mut fragment, &mut design, &config).unwrap_err();
        assert_eq!(err, LowerError::UnresolvedClockDomain("io".into()));
    }

    #[test]
    fn reset_less_config_skips_reset() {
        let (mut design, mut fragment) = fragment_with_sync("vid");
        let config = LowerConfig {
            reset_less_domains: true,
            ..LowerConfig::default()
        };
        let ports = resolve_domains(&mut fragment, &mut design, &config).unwrap();
        assert_eq!(ports.len(), 1);
        assert!(fragment.domain("vid").unwrap().reset.is_none());
    }

    #[test]
    fn declared_domains_are_untouched() {
        let (mut design, mut fragment) = fragment_with_sync("sys");
        let clk = design.add_signal(SignalSpec::new(1));
        let rst = design.add_signal(SignalSpec::new(1));
        fragment.add_domain(ClockDomain::new("sys", clk, rst));
        let ports = resolve_domains(&mut fragment, &mut design, &LowerConfig::default()).unwrap();
        assert!(ports.is_empty());
        assert_eq!(fragment.clock_domains.len(), 1);
        assert_eq!(fragment.domain("sys").unwrap().clock, clk);
    }
}
