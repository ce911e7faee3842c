//! Case Parameters
//!
//! ExSimケーススタディ（Mezquite Inc.）の静的な定数。
//! `GeneratorConfig::case_parameters`が有効な場合のみダッシュボードの既定値に使われ、
//! 無効な場合は各ダッシュボードがゼロの既定値を保持します。

/// 支払条件（支払までのFN数, 割引率）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentTerm {
    pub code: &'static str,
    pub fortnights: u16,
    pub discount: f64,
}

/// 部品1種類のサプライヤー条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartTerms {
    pub batch_size: u32,
    /// サプライヤーA/B/Cの単価
    pub prices: [f64; 3],
    /// サプライヤーA/B/Cの支払FN数
    pub payment_fortnights: [u16; 3],
    pub ordering_cost: f64,
    pub holding_cost: f64,
}

/// ピース1種類の条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceTerms {
    pub batch_size: u32,
    pub price: f64,
}

/// 輸送手段の条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportTerms {
    pub mode: &'static str,
    pub lead_time: u16,
    pub unit_cost: f64,
}

/// 労務条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkforceTerms {
    pub salary_per_fortnight: f64,
    pub minimum_salary: f64,
    pub hiring_cost: f64,
    pub layoff_cost: f64,
}

/// 資金調達条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinanceTerms {
    pub credit_line_rate: f64,
    pub mortgage_rate: f64,
    pub mortgage_limit: f64,
}

/// ケース定数一式
#[derive(Debug, Clone, PartialEq)]
pub struct CaseParameters {
    pub payment_terms: [PaymentTerm; 4],
    pub warehouse_module_cost: f64,
    pub warehouse_module_capacity: f64,
    pub part_a: PartTerms,
    pub part_b: PartTerms,
    pub pieces: [PieceTerms; 6],
    pub workforce: WorkforceTerms,
    pub salesforce_salary_per_fortnight: f64,
    pub finance: FinanceTerms,
    pub transport: [TransportTerms; 3],
}

impl CaseParameters {
    /// Mezquite Inc.のケース定数
    pub fn mezquite() -> Self {
        Self {
            payment_terms: [
                PaymentTerm { code: "A", fortnights: 0, discount: 0.13 },
                PaymentTerm { code: "B", fortnights: 2, discount: 0.075 },
                PaymentTerm { code: "C", fortnights: 4, discount: 0.025 },
                PaymentTerm { code: "D", fortnights: 8, discount: 0.0 },
            ],
            warehouse_module_cost: 800.0,
            warehouse_module_capacity: 100.0,
            part_a: PartTerms {
                batch_size: 30,
                prices: [125.0, 100.0, 140.0],
                payment_fortnights: [0, 2, 8],
                ordering_cost: 2300.0,
                holding_cost: 0.30,
            },
            part_b: PartTerms {
                batch_size: 12,
                prices: [330.0, 264.0, 370.0],
                payment_fortnights: [0, 2, 8],
                ordering_cost: 6000.0,
                holding_cost: 4.5,
            },
            pieces: [
                PieceTerms { batch_size: 1, price: 60.0 },
                PieceTerms { batch_size: 100, price: 7.0 },
                PieceTerms { batch_size: 30, price: 36.0 },
                PieceTerms { batch_size: 60, price: 24.0 },
                PieceTerms { batch_size: 100, price: 30.0 },
                PieceTerms { batch_size: 150, price: 28.0 },
            ],
            workforce: WorkforceTerms {
                salary_per_fortnight: 27.3,
                minimum_salary: 26.0,
                hiring_cost: 240.0,
                layoff_cost: 220.0,
            },
            salesforce_salary_per_fortnight: 750.0,
            finance: FinanceTerms {
                credit_line_rate: 0.10,
                mortgage_rate: 0.06,
                mortgage_limit: 800_000.0,
            },
            // Center-West区間の代表値（最頻の到着FNと最小ロットの単価）
            transport: [
                TransportTerms { mode: "Train", lead_time: 3, unit_cost: 13.20 },
                TransportTerms { mode: "Truck", lead_time: 2, unit_cost: 18.00 },
                TransportTerms { mode: "Plane", lead_time: 1, unit_cost: 19.20 },
            ],
        }
    }

    /// 部品名から条件を取得
    pub fn part(&self, name: &str) -> Option<&PartTerms> {
        match name {
            "Part A" => Some(&self.part_a),
            "Part B" => Some(&self.part_b),
            _ => None,
        }
    }

    /// 輸送手段名から条件を取得
    pub fn transport_mode(&self, mode: &str) -> Option<&TransportTerms> {
        self.transport.iter().find(|t| t.mode == mode)
    }
}

impl Default for CaseParameters {
    fn default() -> Self {
        Self::mezquite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_lookup() {
        let case = CaseParameters::mezquite();
        assert_eq!(case.part("Part A").map(|p| p.batch_size), Some(30));
        assert_eq!(case.part("Part B").map(|p| p.prices[1]), Some(264.0));
        assert!(case.part("Part C").is_none());
    }

    #[test]
    fn test_transport_lookup() {
        let case = CaseParameters::default();
        assert_eq!(case.transport_mode("Plane").map(|t| t.lead_time), Some(1));
        assert!(case.transport_mode("Airplane").is_none());
    }

    #[test]
    fn test_payment_terms_order() {
        let case = CaseParameters::mezquite();
        let codes: Vec<&str> = case.payment_terms.iter().map(|t| t.code).collect();
        assert_eq!(codes, vec!["A", "B", "C", "D"]);
        assert!(case.payment_terms.windows(2).all(|w| w[0].fortnights < w[1].fortnights));
    }
}
