//! Query-string validation. Each route declares its recognized parameters and
//! the legal values for the enumerated ones; validation accumulates every
//! failure in the order the caller supplied the keys, then resolves the pairs
//! into a closed intent enum. Pure functions, no I/O.

const MISSING_QUERY: &str = "you must provide a query";
const MISSING_PARAMETERS: &str = "provide parameters";
const MISSING_FILTER_OR_SCHOOL: &str = "Missing parameters filter or school";

const ACTIVITY_FIELDS: &[&str] = &["activities", "themes"];
const ACTIVITY_FILTERS: &[&str] = &["recent", "unfinished", "finished"];
const ACTIVITY_DETAIL_FIELDS: &[&str] = &["report"];
const MEETING_FILTERS: &[&str] = &["past", "future"];
const MEETING_DETAIL_FIELDS: &[&str] = &["ata"];

enum ValueRule {
    Any,
    OneOf(&'static [&'static str]),
    Digits,
}

struct ParamRule {
    name: &'static str,
    rule: ValueRule,
}

/// Runs the presence/shape checks shared by every route: unrecognized keys,
/// empty values, and enum/digit violations, in supplied-key order. Returns the
/// pairs untouched so the caller can resolve combinations afterwards.
fn check_pairs<'a>(
    pairs: &'a [(String, String)],
    rules: &[ParamRule],
    missing_message: &str,
) -> Result<Checked<'a>, Vec<String>> {
    if pairs.is_empty() {
        return Err(vec![missing_message.to_string()]);
    }

    let mut errors = Vec::new();
    for (key, value) in pairs {
        let Some(rule) = rules.iter().find(|rule| rule.name == key) else {
            errors.push(format!("{key} is an invalid parameter"));
            continue;
        };
        if value.is_empty() {
            errors.push(format!("{key} is empty"));
            continue;
        }
        match rule.rule {
            ValueRule::Any => {}
            ValueRule::OneOf(allowed) => {
                if !allowed.contains(&value.as_str()) {
                    errors.push(format!("{value} is an invalid value for the {key} parameter"));
                }
            }
            ValueRule::Digits => {
                if !value.chars().all(|c| c.is_ascii_digit()) {
                    errors.push(format!("{value} is an invalid value for the {key} parameter"));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Checked { pairs })
    } else {
        Err(errors)
    }
}

struct Checked<'a> {
    pairs: &'a [(String, String)],
}

impl Checked<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ActivitiesListIntent {
    Search { title: String },
    Themes,
    Recent,
    Unfinished { school: Option<String> },
    Finished { school: Option<String>, year: Option<i32> },
    School { school: String },
}

/// `GET /api/activities`. `search` wins over `fields` when both are supplied.
pub(crate) fn activities_list(
    pairs: &[(String, String)],
) -> Result<ActivitiesListIntent, Vec<String>> {
    let rules = [
        ParamRule { name: "search", rule: ValueRule::Any },
        ParamRule { name: "fields", rule: ValueRule::OneOf(ACTIVITY_FIELDS) },
        ParamRule { name: "filter", rule: ValueRule::OneOf(ACTIVITY_FILTERS) },
        ParamRule { name: "school", rule: ValueRule::Any },
        ParamRule { name: "year", rule: ValueRule::Digits },
    ];
    let checked = check_pairs(pairs, &rules, MISSING_QUERY)?;

    if let Some(title) = checked.get("search") {
        return Ok(ActivitiesListIntent::Search { title: title.to_string() });
    }

    let school = checked.get("school").map(str::to_string);
    match checked.get("fields") {
        Some("themes") => Ok(ActivitiesListIntent::Themes),
        Some("activities") => match checked.get("filter") {
            Some("recent") => Ok(ActivitiesListIntent::Recent),
            Some("unfinished") => Ok(ActivitiesListIntent::Unfinished { school }),
            Some("finished") => {
                // Digits-only was already enforced; overly long years still
                // fail to fit an i32 and are reported as invalid values.
                let year = match checked.get("year") {
                    Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                        vec![format!("{raw} is an invalid value for the year parameter")]
                    })?),
                    None => None,
                };
                Ok(ActivitiesListIntent::Finished { school, year })
            }
            _ => match school {
                Some(school) => Ok(ActivitiesListIntent::School { school }),
                None => Err(vec![MISSING_FILTER_OR_SCHOOL.to_string()]),
            },
        },
        _ => Err(vec![MISSING_QUERY.to_string()]),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ActivityDetailIntent {
    Detail,
    Report,
}

/// `GET /api/activities/:id`. An empty query is the plain detail view.
pub(crate) fn activity_detail(
    pairs: &[(String, String)],
) -> Result<ActivityDetailIntent, Vec<String>> {
    if pairs.is_empty() {
        return Ok(ActivityDetailIntent::Detail);
    }
    let rules = [ParamRule { name: "fields", rule: ValueRule::OneOf(ACTIVITY_DETAIL_FIELDS) }];
    let checked = check_pairs(pairs, &rules, MISSING_PARAMETERS)?;
    match checked.get("fields") {
        Some("report") => Ok(ActivityDetailIntent::Report),
        _ => Ok(ActivityDetailIntent::Detail),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MeetingsListIntent {
    Past,
    Future,
}

/// `GET /api/meetings` requires an explicit `filter`.
pub(crate) fn meetings_list(
    pairs: &[(String, String)],
) -> Result<MeetingsListIntent, Vec<String>> {
    let rules = [ParamRule { name: "filter", rule: ValueRule::OneOf(MEETING_FILTERS) }];
    let checked = check_pairs(pairs, &rules, MISSING_QUERY)?;
    match checked.get("filter") {
        Some("past") => Ok(MeetingsListIntent::Past),
        Some("future") => Ok(MeetingsListIntent::Future),
        _ => Err(vec![MISSING_QUERY.to_string()]),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MeetingDetailIntent {
    Detail,
    Ata,
}

/// `GET /api/meetings/:id`. An empty query is the plain detail view.
pub(crate) fn meeting_detail(
    pairs: &[(String, String)],
) -> Result<MeetingDetailIntent, Vec<String>> {
    if pairs.is_empty() {
        return Ok(MeetingDetailIntent::Detail);
    }
    let rules = [ParamRule { name: "fields", rule: ValueRule::OneOf(MEETING_DETAIL_FIELDS) }];
    let checked = check_pairs(pairs, &rules, MISSING_PARAMETERS)?;
    match checked.get("fields") {
        Some("ata") => Ok(MeetingDetailIntent::Ata),
        _ => Ok(MeetingDetailIntent::Detail),
    }
}

/// `PATCH /api/meetings/:id` only exists for `fields=ata`.
pub(crate) fn meeting_update(pairs: &[(String, String)]) -> Result<(), Vec<String>> {
    let rules = [ParamRule { name: "fields", rule: ValueRule::OneOf(MEETING_DETAIL_FIELDS) }];
    let checked = check_pairs(pairs, &rules, MISSING_PARAMETERS)?;
    match checked.get("fields") {
        Some("ata") => Ok(()),
        _ => Err(vec![MISSING_PARAMETERS.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_query_on_list_route() {
        let err = activities_list(&[]).unwrap_err();
        assert_eq!(err, vec!["you must provide a query"]);
    }

    #[test]
    fn empty_search_value() {
        let err = activities_list(&pairs(&[("search", "")])).unwrap_err();
        assert_eq!(err, vec!["search is empty"]);
    }

    #[test]
    fn unrecognized_parameter() {
        let err = activities_list(&pairs(&[("bogus", "1")])).unwrap_err();
        assert_eq!(err, vec!["bogus is an invalid parameter"]);
    }

    #[test]
    fn errors_accumulate_in_supplied_order() {
        let err = activities_list(&pairs(&[
            ("bogus", "1"),
            ("search", ""),
            ("filter", "newest"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            vec![
                "bogus is an invalid parameter",
                "search is empty",
                "newest is an invalid value for the filter parameter",
            ]
        );
    }

    #[test]
    fn invalid_enum_value_message_names_value_and_key() {
        let err = activities_list(&pairs(&[("fields", "meetings")])).unwrap_err();
        assert_eq!(err, vec!["meetings is an invalid value for the fields parameter"]);
    }

    #[test]
    fn year_must_be_digits() {
        let err = activities_list(&pairs(&[
            ("fields", "activities"),
            ("filter", "finished"),
            ("year", "20x3"),
        ]))
        .unwrap_err();
        assert_eq!(err, vec!["20x3 is an invalid value for the year parameter"]);
    }

    #[test]
    fn search_takes_precedence_over_fields() {
        let intent = activities_list(&pairs(&[
            ("search", "compost"),
            ("fields", "themes"),
        ]))
        .unwrap();
        assert_eq!(intent, ActivitiesListIntent::Search { title: "compost".to_string() });
    }

    #[test]
    fn themes_intent() {
        let intent = activities_list(&pairs(&[("fields", "themes")])).unwrap();
        assert_eq!(intent, ActivitiesListIntent::Themes);
    }

    #[test]
    fn recent_intent() {
        let intent =
            activities_list(&pairs(&[("fields", "activities"), ("filter", "recent")])).unwrap();
        assert_eq!(intent, ActivitiesListIntent::Recent);
    }

    #[test]
    fn finished_intent_with_school_and_year() {
        let intent = activities_list(&pairs(&[
            ("fields", "activities"),
            ("filter", "finished"),
            ("school", "Escola Verde"),
            ("year", "2024"),
        ]))
        .unwrap();
        assert_eq!(
            intent,
            ActivitiesListIntent::Finished {
                school: Some("Escola Verde".to_string()),
                year: Some(2024),
            }
        );
    }

    #[test]
    fn activities_without_filter_or_school() {
        let err = activities_list(&pairs(&[("fields", "activities")])).unwrap_err();
        assert_eq!(err, vec!["Missing parameters filter or school"]);
    }

    #[test]
    fn activities_with_school_only() {
        let intent = activities_list(&pairs(&[
            ("fields", "activities"),
            ("school", "Escola Azul"),
        ]))
        .unwrap();
        assert_eq!(intent, ActivitiesListIntent::School { school: "Escola Azul".to_string() });
    }

    #[test]
    fn recognized_params_without_an_intent() {
        let err = activities_list(&pairs(&[("year", "2024")])).unwrap_err();
        assert_eq!(err, vec!["you must provide a query"]);
    }

    #[test]
    fn detail_route_accepts_empty_query() {
        assert_eq!(activity_detail(&[]).unwrap(), ActivityDetailIntent::Detail);
    }

    #[test]
    fn detail_route_report_fields() {
        let intent = activity_detail(&pairs(&[("fields", "report")])).unwrap();
        assert_eq!(intent, ActivityDetailIntent::Report);
        let err = activity_detail(&pairs(&[("fields", "ata")])).unwrap_err();
        assert_eq!(err, vec!["ata is an invalid value for the fields parameter"]);
    }

    #[test]
    fn meetings_list_filters() {
        assert_eq!(meetings_list(&pairs(&[("filter", "past")])).unwrap(), MeetingsListIntent::Past);
        assert_eq!(
            meetings_list(&pairs(&[("filter", "future")])).unwrap(),
            MeetingsListIntent::Future
        );
        assert_eq!(meetings_list(&[]).unwrap_err(), vec!["you must provide a query"]);
        assert_eq!(
            meetings_list(&pairs(&[("filter", "soon")])).unwrap_err(),
            vec!["soon is an invalid value for the filter parameter"]
        );
    }

    #[test]
    fn meeting_update_requires_fields_ata() {
        assert!(meeting_update(&pairs(&[("fields", "ata")])).is_ok());
        assert_eq!(meeting_update(&[]).unwrap_err(), vec!["provide parameters"]);
        assert_eq!(
            meeting_update(&pairs(&[("fields", "report")])).unwrap_err(),
            vec!["report is an invalid value for the fields parameter"]
        );
    }

    #[test]
    fn meeting_detail_empty_and_ata() {
        assert_eq!(meeting_detail(&[]).unwrap(), MeetingDetailIntent::Detail);
        assert_eq!(
            meeting_detail(&pairs(&[("fields", "ata")])).unwrap(),
            MeetingDetailIntent::Ata
        );
    }
}
