//! Shared test cube
//!
//! ```text
//! Store (All Stores)           Gender (All Gender)     Measures
//!   USA: CA, OR, WA              F, M                    Unit Sales, Store Cost
//!   Canada: BC
//! ```
//!
//! Unit Sales: CA 10, OR 5, WA empty, BC 7, USA 15, Canada 7, all stores 22.
//! By gender: CA/F 6, CA/M 4, OR/F 5, OR/M empty.
//! Store Cost: CA 2.5, OR 1.5, BC 3.

#![allow(dead_code)]

use mdx_calc_ast::Exp;
use mdx_calc_eval::{Calc, EvalResult, Evaluator, ExpCompiler, Validator};
use mdx_calc_model::{Cube, MdxConfig, MemoryCube};
use mdx_calc_types::{HierarchyRef, MemberRef, TupleList, Value};
use std::sync::Arc;

pub struct Sales {
    pub cube: Arc<MemoryCube>,
}

impl Sales {
    pub fn new() -> Self {
        let mut b = MemoryCube::builder("Sales");

        let store = b.dimension_with_all("Store", "All Stores");
        let country = b.level(store, "Country");
        let state = b.level(store, "State");
        b.level_property(state, "Population");
        let usa = b.member(country, None, "USA");
        let canada = b.member(country, None, "Canada");
        let ca = b.member(state, Some(usa), "CA");
        let or = b.member(state, Some(usa), "OR");
        b.member(state, Some(usa), "WA");
        let bc = b.member(state, Some(canada), "BC");
        b.caption(ca, "California");
        b.property(ca, "Population", Value::Integer(39));

        let gender = b.dimension_with_all("Gender", "All Gender");
        let gender_level = b.level(gender, "Gender");
        let f = b.member(gender_level, None, "F");
        let m = b.member(gender_level, None, "M");

        let measures = b.measures();
        let sales = b.member(measures, None, "Unit Sales");
        let cost = b.member(measures, None, "Store Cost");

        b.cell(&[ca, sales], 10.0)
            .cell(&[or, sales], 5.0)
            .cell(&[bc, sales], 7.0)
            .cell(&[usa, sales], 15.0)
            .cell(&[canada, sales], 7.0)
            .cell(&[sales], 22.0)
            .cell(&[ca, f, sales], 6.0)
            .cell(&[ca, m, sales], 4.0)
            .cell(&[or, f, sales], 5.0)
            .cell(&[ca, cost], 2.5)
            .cell(&[or, cost], 1.5)
            .cell(&[bc, cost], 3.0);

        Self {
            cube: Arc::new(b.build()),
        }
    }

    /// Member by unique name; the All member may be omitted
    pub fn member(&self, unique_name: &str) -> MemberRef {
        self.cube
            .member(unique_name)
            .unwrap_or_else(|| panic!("no member {}", unique_name))
    }

    pub fn m(&self, unique_name: &str) -> Exp {
        Exp::member(self.member(unique_name))
    }

    pub fn hierarchy_ref(&self, name: &str) -> HierarchyRef {
        self.cube
            .lookup_hierarchy(name, true)
            .unwrap_or_else(|| panic!("no hierarchy {}", name))
    }

    pub fn hierarchy(&self, name: &str) -> Exp {
        Exp::hierarchy(self.hierarchy_ref(name))
    }

    pub fn level(&self, hierarchy: &str, level: &str) -> Exp {
        let level = self
            .hierarchy_ref(hierarchy)
            .levels()
            .into_iter()
            .find(|l| l.name() == level)
            .unwrap_or_else(|| panic!("no level {}", level));
        Exp::level(level)
    }

    /// `{m1, m2, ...}` of the given members
    pub fn set(&self, unique_names: &[&str]) -> Exp {
        Exp::braces(unique_names.iter().map(|n| self.m(n)).collect())
    }

    pub fn evaluator(&self) -> Evaluator {
        self.evaluator_with(MdxConfig::default())
    }

    pub fn evaluator_with(&self, config: MdxConfig) -> Evaluator {
        Evaluator::builder(self.cube.clone()).config(config).build()
    }

    pub fn compile(&self, exp: Exp) -> Calc {
        let exp = Validator::standard().validate(exp).expect("validation failed");
        ExpCompiler::standard().compile(&exp).expect("compilation failed")
    }

    pub fn try_eval(&self, exp: Exp) -> EvalResult<Value> {
        let calc = self.compile(exp);
        self.evaluator().execute(&calc)
    }

    pub fn eval(&self, exp: Exp) -> Value {
        self.try_eval(exp).expect("evaluation failed")
    }

    /// Evaluate a set and render each tuple as its member names joined by `/`
    pub fn eval_set(&self, exp: Exp) -> Vec<String> {
        let mut evaluator = self.evaluator();
        self.eval_set_in(exp, &mut evaluator)
    }

    pub fn eval_set_in(&self, exp: Exp, evaluator: &mut Evaluator) -> Vec<String> {
        let calc = self.compile(exp);
        let list = calc.evaluate_list(evaluator).expect("evaluation failed");
        names(&list)
    }
}

pub fn names(list: &TupleList) -> Vec<String> {
    list.iter()
        .map(|tuple| {
            tuple
                .iter()
                .map(|m| m.name().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

pub fn truthy() -> Exp {
    Exp::infix("=", Exp::integer(1), Exp::integer(1))
}

pub fn falsy() -> Exp {
    Exp::infix("=", Exp::integer(1), Exp::integer(0))
}

/// A boolean expression that fails when evaluated
pub fn failing() -> Exp {
    Exp::function(
        "IsEmpty",
        vec![Exp::function("StrToMember", vec![Exp::string("")])],
    )
}
