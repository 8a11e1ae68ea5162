use zpoolctl_schema::PoolName;

/// Value reported for a property that is unset or unsupported on this platform.
pub const PROPERTY_UNAVAILABLE: &str = "-";

/// Pick the value column out of `zpool get <property> <pool>` output.
///
/// Lines are `name property value source`. When several lines name the pool,
/// the last one wins.
pub fn parse_property_value(output: &str, pool: &str) -> Option<String> {
    output.lines().rev().find_map(|line| {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        let _property = fields.next()?;
        let value = fields.next()?;
        (name == pool).then(|| value.to_owned())
    })
}

/// Pool names from `zpool list -H` output (first tab-separated column).
pub fn parse_pool_list(output: &str) -> Vec<PoolName> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(PoolName::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_value_for_matching_pool() {
        let out = "NAME  PROPERTY    VALUE   SOURCE\ntank  autoexpand  on      local\n";
        assert_eq!(parse_property_value(out, "tank").as_deref(), Some("on"));
    }

    #[test]
    fn last_matching_line_wins() {
        let out = "tank failmode wait default\n\
                   other failmode panic local\n\
                   tank failmode continue local\n";
        assert_eq!(parse_property_value(out, "tank").as_deref(), Some("continue"));
    }

    #[test]
    fn no_match_is_none() {
        let out = "NAME PROPERTY VALUE SOURCE\nother ashift 12 local\n";
        assert_eq!(parse_property_value(out, "tank"), None);
        assert_eq!(parse_property_value("", "tank"), None);
    }

    #[test]
    fn short_lines_are_skipped() {
        let out = "tank ashift\ntank ashift 9 local\ntank\n";
        assert_eq!(parse_property_value(out, "tank").as_deref(), Some("9"));
    }

    #[test]
    fn lists_pool_names() {
        let out = "tank\t3.62T\t1.2T\t2.4T\t-\t33%\tONLINE\t-\n\
                   rpool\t476G\t120G\t356G\t-\t25%\tONLINE\t-\n";
        assert_eq!(parse_pool_list(out), vec![PoolName::from("tank"), PoolName::from("rpool")]);
        assert!(parse_pool_list("").is_empty());
    }
}
