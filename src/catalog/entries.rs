use super::{Indicator, Topic};

use Topic::*;

const fn ind(code: &'static str, name: &'static str, topic: Topic, description: &'static str) -> Indicator {
    Indicator {
        code,
        name,
        topic,
        description: Some(description),
    }
}

pub static INDICATORS: [Indicator; 45] = [
    // Business Environment
    ind(
        "IC.BUS.EASE.DFRN.XQ.DB1719",
        "Global: Ease of doing business score (DB17-20 methodology)",
        BusinessEnvironment,
        "Overall ease of doing business score under the DB17-20 methodology. It aggregates the regulatory \
         areas that affect firms: starting a business, investor protection, construction permits, access to credit, and so on.",
    ),
    ind(
        "IC.BUS.EASE.XQ",
        "Ease of doing business rank (1=most business-friendly regulations)",
        BusinessEnvironment,
        "Position of the economy relative to the others on business-friendly conditions. \
         A rank of 1 means the most favorable regulations.",
    ),
    ind(
        "IC.CNST.PRMT.RK",
        "Rank: Dealing with construction permits (1=most business-friendly regulations)",
        BusinessEnvironment,
        "How easily a firm obtains construction permits. A lower rank means simpler and cheaper procedures.",
    ),
    ind(
        "IC.CRED.ACC.CRD.RK",
        "Rank: Getting credit (1=most business-friendly regulations)",
        BusinessEnvironment,
        "How easily firms access credit. A rank of 1 suggests the best access to financing.",
    ),
    ind(
        "IC.ELC.ACES.RK.DB19",
        "Rank: Getting electricity (1=most business-friendly regulations)",
        BusinessEnvironment,
        "How easily firms obtain an electricity connection, including its reliability.",
    ),
    ind(
        "IC.REG.STRT.BUS.RK.DB19",
        "Rank: Starting a business (1=most business-friendly regulations)",
        BusinessEnvironment,
        "How easy it is to start a business: administrative procedures, cost, and time required.",
    ),
    ind(
        "PAY.TAX.RK.DB19",
        "Rank: Paying taxes (1=most business-friendly regulations)",
        BusinessEnvironment,
        "How easily firms pay their taxes. A rank of 1 means simpler and cheaper tax procedures.",
    ),
    ind(
        "RESLV.ISV.RK.DB19",
        "Rank: Resolving insolvency (1=most business-friendly regulations)",
        BusinessEnvironment,
        "Efficiency of the legal framework for resolving insolvency: speed, cost, and recovery.",
    ),
    ind(
        "TRD.ACRS.BRDR.RK.DB19",
        "Rank: Trading across borders (1=most business-friendly regulations)",
        BusinessEnvironment,
        "Ease of cross-border trade, including customs procedures and logistics. A rank of 1 suggests the lowest barriers.",
    ),
    // Economic Performance
    ind(
        "NY.GDP.MKTP.CD",
        "GDP (current US$)",
        EconomicPerformance,
        "Gross domestic product in current US dollars: the total value of final goods and services produced in a year.",
    ),
    ind(
        "NY.GDP.PCAP.CD",
        "GDP per capita (current US$)",
        EconomicPerformance,
        "GDP divided by total population, a rough measure of the average standard of living.",
    ),
    ind(
        "NY.GDP.DEFL.KD.ZG",
        "Inflation, GDP deflator (annual %)",
        EconomicPerformance,
        "Economy-wide price change measured by the GDP deflator, as an annual percentage.",
    ),
    ind(
        "NY.GDP.MKTP.KD.ZG",
        "GDP growth (annual %)",
        EconomicPerformance,
        "Annual percentage change of real output.",
    ),
    ind(
        "NY.GDP.PCAP.KD.ZG",
        "GDP per capita growth (annual %)",
        EconomicPerformance,
        "Annual percentage change of real GDP per person.",
    ),
    ind(
        "NY.GNS.ICTR.CD",
        "Gross savings (current US$)",
        EconomicPerformance,
        "Share of national income that is not consumed and is available for investment, in current US dollars.",
    ),
    // Trade & Investment
    ind(
        "BG.GSR.NFSV.GD.ZS",
        "Trade in services (% of GDP)",
        TradeInvestment,
        "Exports plus imports of services as a share of GDP.",
    ),
    ind(
        "BM.GSR.GNFS.CD",
        "Imports of goods and services (BoP, current US$)",
        TradeInvestment,
        "Total value of goods and services bought from abroad, balance-of-payments basis.",
    ),
    ind(
        "BM.KLT.DINV.WD.GD.ZS",
        "Foreign direct investment, net outflows (% of GDP)",
        TradeInvestment,
        "Net direct investment made abroad by residents, as a share of GDP.",
    ),
    ind(
        "BN.CAB.XOKA.GD.ZS",
        "Current account balance (% of GDP)",
        TradeInvestment,
        "Exports minus imports of goods and services plus net primary and secondary income, as a share of GDP.",
    ),
    ind(
        "BN.KLT.DINV.CD",
        "Foreign direct investment, net (BoP, current US$)",
        TradeInvestment,
        "Direct investment received minus direct investment made abroad, balance-of-payments basis.",
    ),
    ind(
        "BN.KLT.PTXL.CD",
        "Portfolio Investment, net (BoP, current US$)",
        TradeInvestment,
        "Net purchases of equity and debt securities by non-residents, balance-of-payments basis.",
    ),
    ind(
        "BX.GSR.GNFS.CD",
        "Exports of goods and services (BoP, current US$)",
        TradeInvestment,
        "Total value of goods and services sold abroad, balance-of-payments basis.",
    ),
    // Financial Indicators
    ind(
        "CM.MKT.LCAP.GD.ZS",
        "Market capitalization of listed domestic companies (% of GDP)",
        Financial,
        "Total market value of domestic listed companies as a share of GDP.",
    ),
    ind(
        "GB.XPD.RSDV.GD.ZS",
        "Research and development expenditure (% of GDP)",
        Financial,
        "Spending on research and experimental development as a share of GDP.",
    ),
    ind(
        "GC.DOD.TOTL.GD.ZS",
        "Central government debt, total (% of GDP)",
        Financial,
        "Outstanding central government debt relative to the size of the economy.",
    ),
    // Social Indicators
    ind(
        "EN.POP.DNST",
        "Population density (people per sq. km of land area)",
        Social,
        "Midyear population divided by land area in square kilometers.",
    ),
    ind(
        "FI.RES.TOTL.CD",
        "Total reserves (includes gold, current US$)",
        Social,
        "Reserve assets held by the monetary authorities, gold included.",
    ),
    ind(
        "FP.CPI.TOTL",
        "Consumer price index (2010 = 100)",
        Social,
        "Average change in the prices of the basket of goods and services bought by households.",
    ),
    ind(
        "FP.CPI.TOTL.ZG",
        "Inflation, consumer prices (annual %)",
        Social,
        "Annual percentage change in the consumer price index.",
    ),
    ind(
        "FP.WPI.TOTL",
        "Wholesale price index (2010 = 100)",
        Social,
        "Price changes of goods early in the production chain.",
    ),
    ind(
        "SE.ADT.LITR.ZS",
        "Literacy rate, adult total (% of people ages 15 and above)",
        Social,
        "Share of people aged 15 and above who can read and write.",
    ),
    ind(
        "SE.ADT.1524.LT.ZS",
        "Literacy rate, youth total (% of people ages 15-24)",
        Social,
        "Share of people aged 15 to 24 who can read and write.",
    ),
    ind(
        "SH.DTH.IMRT",
        "Number of infant deaths",
        Social,
        "Number of children dying before their first birthday.",
    ),
    ind(
        "SH.MED.BEDS.ZS",
        "Hospital beds (per 1,000 people)",
        Social,
        "Inpatient beds available per 1,000 people, a proxy for medical infrastructure.",
    ),
    ind(
        "SI.POV.GINI",
        "Gini index",
        Social,
        "Inequality of the income distribution. 0 is perfect equality, 100 is maximal inequality.",
    ),
    ind(
        "SL.UEM.1524.NE.ZS",
        "Unemployment, youth total (% of total labor force ages 15-24) (national estimate)",
        Social,
        "Share of the labor force aged 15 to 24 without work and actively seeking it.",
    ),
    ind(
        "SL.UEM.TOTL.NE.ZS",
        "Unemployment, total (% of total labor force) (national estimate)",
        Social,
        "Share of the labor force without work and actively seeking it.",
    ),
    ind(
        "SM.POP.NETM",
        "Net migration",
        Social,
        "Immigrants minus emigrants. A positive value means more people arrived than left.",
    ),
    ind(
        "SP.DYN.LE00.IN",
        "Life expectancy at birth, total (years)",
        Social,
        "Years a newborn would live if current mortality patterns stayed the same.",
    ),
    ind(
        "SP.POP.GROW",
        "Population growth (annual %)",
        Social,
        "Annual rate at which the population grows or shrinks.",
    ),
    ind(
        "SP.POP.TOTL",
        "Population, total",
        Social,
        "All residents regardless of legal status or citizenship, midyear estimate.",
    ),
    ind(
        "SP.RUR.TOTL",
        "Rural population",
        Social,
        "People living in rural areas.",
    ),
    ind(
        "SP.URB.TOTL",
        "Urban population",
        Social,
        "People living in urban areas.",
    ),
    // Governance Indicators
    ind(
        "GE.EST",
        "Government Effectiveness: Estimate",
        Governance,
        "Perceived quality of public services, of policy formulation and implementation, and credibility of government commitments.",
    ),
    ind(
        "PV.EST",
        "Political Stability and Absence of Violence/Terrorism: Estimate",
        Governance,
        "Perceived likelihood of political instability or politically motivated violence, including terrorism.",
    ),
];
