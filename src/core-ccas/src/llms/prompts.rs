use std::collections::HashMap;

use indoc::indoc;
use subst::substitute;

use crate::Error;

const RESEARCH_CITY: &str = indoc! { r#"
  You are an education policy researcher who studies how students are admitted and assigned to schools.
  Research the school admission system of the place below using web search. Prefer official sources
  (ministries, school districts, municipal websites, legislation), then peer-reviewed papers, then press.

  <target>
  Country: ${COUNTRY}
  City: ${CITY}
  Education level: ${EDUCATION_LEVEL}
  </target>

  Definition: the admission system is **Coordinated** when ALL of these hold:
  1. Applicants submit a ranked list of preferred institutions.
  2. An external authority partially or fully determines enrollment for a group of institutions.
  3. Each applicant receives a single offer produced by a centralized algorithm.
  If any condition fails, the system is **Uncoordinated**. If you cannot tell, it is **Unknown**.

  Fields to report (every field must be present):
  - ccas_status: "Coordinated", "Uncoordinated" or "Unknown".
  - participating_institutions: "Public", "Private", "Both" or "Unknown".
  - preference_list_length: maximum number of institutions an applicant may rank, or "Unknown".
  - priority_criteria: list of criteria used to break ties between applicants, using these codes:
    academic, distance, family, sen, gender, ses, sibling, diversity, zone, rural, religion, race,
    alumni, incumbent, population, field, gifted, time, other. Use ["Unknown"] if none are documented.
  - assignment_mechanism: "Immediate Acceptance", "Deferred Acceptance", "Serial Dictatorship",
    "Top Trading Cycles", "Other" or "Unknown".
  - adoption_year: year the coordinated system was first used, or "Unknown".
  - reform_year: year of the most recent major reform, or the adoption year when there was none.
  - notes: at most 250 words describing the system, its name, caveats and data quality issues.
  Every field except notes also has a matching "<field>_source" entry holding the URL(s) that support it,
  or "Unknown" when no source was found.

  Rules:
  - When ccas_status is "Uncoordinated" or "Unknown", every other field except notes and the sources is "Unknown".
  - Never invent facts. Use "Unknown" and explain in notes instead.
  - Answer with ONE JSON object and nothing else: no markdown, no commentary.

  The JSON object has exactly these keys:
  {
    "ccas_status": "...",
    "ccas_status_source": "...",
    "participating_institutions": "...",
    "participating_institutions_source": "...",
    "preference_list_length": "...",
    "preference_list_length_source": "...",
    "priority_criteria": ["..."],
    "priority_criteria_source": "...",
    "assignment_mechanism": "...",
    "assignment_mechanism_source": "...",
    "adoption_year": "...",
    "adoption_year_source": "...",
    "reform_year": "...",
    "reform_year_source": "...",
    "notes": "..."
  }
"# };

/// Level used in the prompt when the row doesn't name one.
const ANY_EDUCATION_LEVEL: &str = "All levels (report the level with a coordinated system, if any)";

/// Renders the deep-research prompt for one city.
pub fn prompt_research_city(country: &str, city: &str, education_level: &str) -> Result<String, Error> {
    let education_level = match education_level.trim() {
        "" => ANY_EDUCATION_LEVEL,
        level => level,
    };
    let res = substitute(RESEARCH_CITY, &{
        let mut v = HashMap::new();
        v.insert("COUNTRY".to_string(), country.trim().to_string());
        v.insert("CITY".to_string(), city.trim().to_string());
        v.insert("EDUCATION_LEVEL".to_string(), education_level.to_string());
        v
    })?;
    Ok(res)
}
