use pme_core::diagnostic::{ACTION_LOW_MARGIN, ACTION_MAINTAIN, ACTION_WEAK_UNIT_ECONOMICS};
use pme_core::{
    diagnose, BusinessInput, CalcTrace, Diagnostic, PercentLike, RawBusinessInput, Runway,
    Sector, Severity,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn run(payload: Value) -> Diagnostic {
    let raw: RawBusinessInput = serde_json::from_value(payload).unwrap();
    let mut trace = CalcTrace::new();
    let input = BusinessInput::normalize(&raw, &mut trace);
    diagnose(&input, &mut trace).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_retail_revenue_only_scenario() {
    let d = run(json!({ "setor": "varejo", "receita_mensal": 10000 }));

    assert_eq!(d.input.direct_cost_ratio, 0.62);
    assert!(approx(d.base.contribution_ratio, 0.38));
    assert!(approx(d.base.contribution_margin, 3800.0));
    assert!(approx(d.input.fixed_expenses, 3000.0));
    assert!(approx(d.base.ebitda, 800.0));
    assert!((d.base.breakeven.unwrap() - 7894.74).abs() < 0.01);
    assert_eq!(d.base.runway, Runway::Infinite);
    assert_eq!(d.score, 75);
    assert_eq!(d.ltv_cac(), None);
    assert_eq!(d.actions, vec![ACTION_MAINTAIN]);
}

#[test]
fn test_recurring_scenario_with_default_churn() {
    let d = run(json!({
        "setor": "recorrencia",
        "receita_mensal": 5000,
        "clientes_ativos": 100,
        "cac": 50
    }));

    assert_eq!(d.input.churn, Some(0.05));
    assert_eq!(d.input.average_ticket, 50.0);

    let r = d.recurring.unwrap();
    let margem_cliente = 50.0 * d.base.contribution_ratio;
    assert!(approx(r.customer_contribution, margem_cliente));
    assert!(approx(r.ltv, margem_cliente / 0.05));
    assert!(approx(r.ltv_cac.unwrap(), r.ltv / 50.0));
    assert_eq!(d.indicators.customers, Severity::Green);
    // 50 + 10 (ebitda) + 15 (infinite runway) + 15 (ltv/cac >= 3)
    assert_eq!(d.score, 90);
}

#[test]
fn test_sector_direct_cost_defaults() {
    for (sector, expected) in [("varejo", 0.62), ("servicos", 0.30), ("recorrencia", 0.22)] {
        let d = run(json!({ "setor": sector, "receita_mensal": 1000 }));
        assert_eq!(d.input.direct_cost_ratio, expected, "sector {sector}");
    }
}

#[test]
fn test_zero_churn_uses_floor() {
    let d = run(json!({
        "setor": "recorrencia",
        "receita_mensal": 1000,
        "ticket_medio": 10,
        "churn_pct": 0
    }));
    let r = d.recurring.unwrap();
    assert_eq!(d.input.churn, Some(0.0));
    assert_eq!(r.churn_floor, 0.0001);
    assert!(r.ltv.is_finite());
    assert!(approx(r.ltv, 10.0 * 0.78 / 0.0001));
}

#[test]
fn test_non_recurring_sectors_never_compute_ltv() {
    for sector in ["varejo", "servicos"] {
        let d = run(json!({ "setor": sector, "receita_mensal": 1000, "cac": 10, "churn_pct": 20 }));
        assert!(d.recurring.is_none());
        assert_eq!(d.ltv_cac(), None);
        assert!(!d.flags.high_churn);
        assert!(!d.flags.weak_unit_economics);
        assert_eq!(d.indicators.customers, Severity::Yellow);
    }
}

#[test]
fn test_high_churn_flag_has_no_action() {
    let d = run(json!({
        "setor": "recorrencia",
        "receita_mensal": 10000,
        "clientes_ativos": 100,
        "churn_pct": 10
    }));
    assert!(d.flags.high_churn);
    assert_eq!(d.indicators.customers, Severity::Red);
    assert_eq!(d.actions, vec![ACTION_MAINTAIN]);
}

#[test]
fn test_weak_unit_economics_and_low_margin_actions() {
    let d = run(json!({
        "setor": "recorrencia",
        "receita_mensal": 1000,
        "custo_direto_pct": 80,
        "despesas_fixas": 100,
        "clientes_ativos": 10,
        "cac": 500
    }));
    assert!(d.flags.low_margin);
    assert!(d.flags.weak_unit_economics);
    assert!(!d.flags.tight_cash);
    assert_eq!(d.actions, vec![ACTION_LOW_MARGIN, ACTION_WEAK_UNIT_ECONOMICS]);
    assert_eq!(d.indicators.costs, Severity::Red);
    // ltv = 100 * 0.2 / 0.05 = 400, ltv/cac = 0.8
    // 50 + 10 (ebitda) + 15 (infinite runway) - 10 (ltv/cac < 1)
    assert!(approx(d.ltv_cac().unwrap(), 0.8));
    assert_eq!(d.score, 65);
}

#[test]
fn test_middling_ltv_cac_is_score_neutral() {
    let d = run(json!({
        "setor": "recorrencia",
        "receita_mensal": 1000,
        "custo_direto_pct": 80,
        "despesas_fixas": 100,
        "clientes_ativos": 10,
        "cac": 200
    }));
    assert!(approx(d.ltv_cac().unwrap(), 2.0));
    assert!(d.flags.weak_unit_economics);
    assert_eq!(d.score, 75);
}

#[test]
fn test_runway_bands_drive_cash_indicator() {
    // ebitda = 10000 * 0.7 - 8000 = -1000
    let base = json!({ "setor": "servicos", "receita_mensal": 10000, "despesas_fixas": 8000 });
    let with_cash = |cash: f64| {
        let mut payload = base.clone();
        payload["caixa"] = json!(cash);
        run(payload)
    };

    let comfortable = with_cash(9000.0);
    assert_eq!(comfortable.indicators.cash, Severity::Green);
    let watch = with_cash(7000.0);
    assert_eq!(watch.indicators.cash, Severity::Yellow);
    assert!(!watch.flags.tight_cash);
    assert_eq!(watch.base.runway, Runway::Finite(7.0));
    // 50 - 10 (ebitda), runway between 6 and 9 months adds nothing
    assert_eq!(watch.score, 40);
    let tight = with_cash(1000.0);
    assert_eq!(tight.indicators.cash, Severity::Red);
    assert!(tight.flags.tight_cash);
}

fn field() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1.0e6..1.0e7f64).prop_map(Value::from),
        (0u32..500).prop_map(Value::from),
        "[a-z0-9.% ]{0,6}".prop_map(Value::from),
    ]
}

fn payload() -> impl Strategy<Value = Value> {
    (
        prop_oneof![
            Just(json!("varejo")),
            Just(json!("servicos")),
            Just(json!("recorrencia")),
            Just(json!("outro")),
            Just(Value::Null),
        ],
        proptest::collection::vec(field(), 8),
    )
        .prop_map(|(setor, f)| {
            json!({
                "setor": setor,
                "receita_mensal": f[0],
                "custo_direto_pct": f[1],
                "despesas_fixas": f[2],
                "caixa": f[3],
                "clientes_ativos": f[4],
                "ticket_medio": f[5],
                "churn_pct": f[6],
                "cac": f[7],
            })
        })
}

proptest! {
    #[test]
    fn prop_diagnostic_is_pure(p in payload()) {
        let first = run(p.clone());
        let second = run(p);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_score_is_bounded_and_actions_non_empty(p in payload()) {
        let d = run(p);
        prop_assert!(d.score <= 100);
        prop_assert!(!d.actions.is_empty());
        prop_assert!(d.base.contribution_ratio >= 0.0);
        prop_assert!(d.base.burn >= 0.0);
        if d.base.ebitda >= 0.0 {
            prop_assert_eq!(d.base.runway, Runway::Infinite);
        }
        if d.sector() != Sector::Recorrencia {
            prop_assert!(d.recurring.is_none());
        }
    }

    #[test]
    fn prop_percent_forms_agree(pct in 2u32..=100) {
        let whole = PercentLike::from_number(f64::from(pct)).unwrap();
        let fraction = PercentLike::from_number(f64::from(pct) / 100.0).unwrap();
        prop_assert!((whole.fraction() - fraction.fraction()).abs() < 1e-12);
    }

    #[test]
    fn prop_percent_is_clamped(n in proptest::num::f64::ANY) {
        if let Some(p) = PercentLike::from_number(n) {
            prop_assert!((0.0..=0.999_999).contains(&p.fraction()));
        }
    }
}
