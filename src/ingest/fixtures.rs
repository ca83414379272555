/// Test fixtures: small delimited payloads shaped like the flood risk data.
///
/// Column layout of the training fixtures:
///   nivel_chuva_mm        - rainfall (mm)
///   historico_alagamentos - past flood count
///   altitude_m            - altitude (m)
///   permeabilidade_solo   - soil permeability (0..1)
///   distancia_rio_km      - distance to river (km)
///   risco_alagamento      - target: 0 low, 1 medium, 2 high
///
/// The three classes are well separated (dry/high/far vs. wet/low/near) so
/// a k=3 classifier labels held-out points unambiguously.

/// Twelve rows, four per class, target as the last column.
/// Row 0 is low risk with 12.5 mm of rain; row 11 is high risk.
pub(crate) fn fixture_training_csv() -> &'static str {
    "nivel_chuva_mm,historico_alagamentos,altitude_m,permeabilidade_solo,distancia_rio_km,risco_alagamento
12.5,0,42.0,0.85,4.8,0
15.0,0,40.5,0.80,4.5,0
18.2,1,38.0,0.82,4.9,0
10.9,0,44.1,0.88,4.2,0
62.0,2,24.0,0.50,2.4,1
58.3,2,26.5,0.45,2.6,1
65.1,3,22.8,0.52,2.2,1
60.7,2,25.1,0.48,2.5,1
118.4,5,6.2,0.15,0.3,2
122.0,4,5.8,0.12,0.2,2
115.9,5,7.1,0.18,0.4,2
127.3,5,5.2,0.11,0.1,2
"
}

/// Target column first; features follow.
pub(crate) fn fixture_target_first_csv() -> &'static str {
    "risco_alagamento,nivel_chuva_mm,altitude_m
1,60.0,25.0
2,120.0,6.0
0,14.0,41.0
"
}

/// Same features as the training fixture but no target column.
pub(crate) fn fixture_no_target_csv() -> &'static str {
    "nivel_chuva_mm,historico_alagamentos,altitude_m,permeabilidade_solo,distancia_rio_km
12.5,0,42.0,0.85,4.8
118.4,5,6.2,0.15,0.3
"
}

/// Second data row has one field too many.
pub(crate) fn fixture_ragged_csv() -> &'static str {
    "nivel_chuva_mm,altitude_m,risco_alagamento
12.5,42.0,0
118.4,6.2,2,99
"
}

/// A categorical value in a numeric feature column.
pub(crate) fn fixture_non_numeric_csv() -> &'static str {
    "nivel_chuva_mm,altitude_m,risco_alagamento
12.5,42.0,0
118.4,low,2
"
}

/// New data with an identifier column in front and the features in a
/// different order than training. Row 0 is a wet, low-lying point.
pub(crate) fn fixture_new_data_extra_columns_csv() -> &'static str {
    "area_id,altitude_m,distancia_rio_km,nivel_chuva_mm,permeabilidade_solo,historico_alagamentos
riverside,8.0,0.2,110.0,0.14,5
hilltop,43.0,4.7,13.0,0.86,0
"
}

/// New data missing `distancia_rio_km`.
pub(crate) fn fixture_new_data_missing_column_csv() -> &'static str {
    "nivel_chuva_mm,historico_alagamentos,altitude_m,permeabilidade_solo
110.0,5,8.0,0.14
"
}
